//! spn-core: runtime determinista de procesamiento de señales.
//!
//! Un `Engine` enhebra un estado opaco a través de un `Pipeline` ordenado de
//! steps puros y devuelve emisiones con trazabilidad causal (`caused_by`).
//! El runtime no hace I/O, no persiste estado y no interpreta payloads.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod hashing;
pub mod model;
pub mod protocols;
pub mod step;
pub mod transforms;

pub use engine::Engine;
pub use errors::{BatchError, RuntimeError, SerializationError, StepError, Violation};
pub use model::{Emission, Metadata, Signal};
pub use protocols::{drive, DriveError, DriveReport, EmissionSink, GameProtocol, IterSource, MemorySink, SignalSource};
pub use step::{named, Flow, Pipeline, PipelineBuilder, Predicate, StateUpdate, Step, StepOutput, StepResult};
pub use transforms::{accumulate, branch, emit, emit_if, filter_signal, map_signal, merge, offset_timestamp,
                     signal_timestamp, suffixed_id, window, StateLens, WindowBuffer, WindowEntry, WindowMode,
                     WindowTrigger};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn stage(id: &'static str) -> impl Fn(&Signal<Value>, &Vec<String>) -> StepResult<Value, Vec<String>> + Send + Sync {
        move |signal: &Signal<Value>, _: &Vec<String>| {
            let emission = Emission::derived(signal, id, format!("stage.{id}"), json!({ "stage": id }));
            let record = move |seen: &Vec<String>| {
                let mut next = seen.clone();
                next.push(id.to_string());
                next
            };
            Ok(StepOutput::one(emission).updating(record))
        }
    }

    #[test]
    fn three_stage_chain_emits_in_step_order() {
        let pipeline = Pipeline::builder("chain").step(named("ingest", stage("ingest")))
                                                 .step(named("resolve", stage("resolve")))
                                                 .step(named("emit", stage("emit")))
                                                 .build();
        let mut engine = Engine::from_pipeline(pipeline, Vec::new());
        let signal = Signal::new("sig_1",
                                 Utc.with_ymd_and_hms(2026, 2, 6, 13, 0, 0).unwrap(),
                                 "demo",
                                 json!({"k": "v"}));

        let out = engine.process(&signal).expect("chain should run");

        let ids: Vec<&str> = out.iter().map(|e| e.emission_id()).collect();
        assert_eq!(ids, vec!["sig_1:ingest", "sig_1:resolve", "sig_1:emit"]);
        assert!(out.iter().all(|e| e.caused_by() == "sig_1"));
        assert_eq!(engine.state(), &vec!["ingest", "resolve", "emit"]);
    }
}
