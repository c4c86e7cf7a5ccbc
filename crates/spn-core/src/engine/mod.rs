//! Engine module: ejecución determinista de un `Pipeline` sobre un estado.

pub mod core;

pub use self::core::Engine;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{RuntimeError, StepError, Violation};
    use crate::model::{Emission, Signal};
    use crate::step::{named, Pipeline, StateUpdate, StepOutput, StepResult};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        seen: u32,
        last: String,
    }

    fn signal(id: &str, n: u32) -> Signal<u32> {
        Signal::new(id, Utc.with_ymd_and_hms(2026, 2, 6, 13, 0, 0).unwrap(), "test", n)
    }

    fn count(signal: &Signal<u32>, state: &Counter) -> StepResult<u32, Counter> {
        let id = signal.signal_id().to_string();
        let emission = Emission::derived(signal, "count", "count", json!({"before": state.seen}));
        Ok(StepOutput::one(emission).updating(move |s: &Counter| Counter { seen: s.seen + 1,
                                                                          last: id }))
    }

    fn report(signal: &Signal<u32>, state: &Counter) -> StepResult<u32, Counter> {
        Ok(StepOutput::one(Emission::derived(signal, "report", "report", json!({"seen": state.seen}))))
    }

    fn reject_odd(signal: &Signal<u32>, _state: &Counter) -> StepResult<u32, Counter> {
        if signal.payload() % 2 == 1 {
            return Err(StepError::new("odd payload"));
        }
        Ok(StepOutput::none())
    }

    #[test]
    fn later_steps_observe_earlier_updates() {
        let pipeline = Pipeline::builder("count_report").step(named("count", count))
                                                        .step(named("report", report))
                                                        .build();
        let mut engine = Engine::from_pipeline(pipeline, Counter::default());

        let out = engine.process(&signal("sig_1", 2)).expect("process should succeed");

        assert_eq!(out[0].payload(), &json!({"before": 0}));
        assert_eq!(out[1].payload(), &json!({"seen": 1}));
        assert_eq!(engine.state(), &Counter { seen: 1, last: "sig_1".into() });
        assert_eq!(engine.processed_signals(), 1);
    }

    #[test]
    fn failing_step_rolls_back_the_whole_signal() {
        let pipeline = Pipeline::builder("count_then_reject").step(named("count", count))
                                                             .step(named("reject_odd", reject_odd))
                                                             .build();
        let mut engine = Engine::from_pipeline(pipeline, Counter::default());
        engine.process(&signal("sig_1", 2)).expect("even payload passes");
        let before = engine.snapshot();

        let err = engine.process(&signal("sig_2", 3)).unwrap_err();

        assert!(matches!(&err, RuntimeError::StepExecution { step_id, step_index: 1, .. } if step_id == "reject_odd"));
        assert_eq!(err.step_error().map(|e| e.message.as_str()), Some("odd payload"));
        assert_eq!(engine.state(), &before);
        assert_eq!(engine.processed_signals(), 1);
    }

    #[test]
    fn foreign_cause_is_a_contract_violation() {
        fn forge(signal: &Signal<u32>, _state: &Counter) -> StepResult<u32, Counter> {
            Ok(StepOutput::one(Emission::new("x", "forged", "someone_else", signal.timestamp(), json!({}))))
        }
        let mut engine = Engine::from_pipeline(Pipeline::builder("forge").step(named("forge", forge)).build(),
                                               Counter::default());

        let err = engine.process(&signal("sig_1", 0)).unwrap_err();

        assert!(matches!(err,
                         RuntimeError::ContractViolation { violation: Violation::ForeignCause { .. }, .. }));
    }

    #[test]
    fn failing_replacer_is_a_contract_violation_and_rolls_back() {
        fn broken_update(signal: &Signal<u32>, _state: &Counter) -> StepResult<u32, Counter> {
            let emission = Emission::derived(signal, "broken", "broken", json!({}));
            let update = StateUpdate::fallible(|_: &Counter| Err(StepError::new("cannot replace")));
            Ok(StepOutput::one(emission).with_update(update))
        }
        let pipeline = Pipeline::builder("count_then_break").step(named("count", count))
                                                            .step(named("broken", broken_update))
                                                            .build();
        let mut engine = Engine::from_pipeline(pipeline, Counter::default());

        let err = engine.process(&signal("sig_1", 2)).unwrap_err();

        match &err {
            RuntimeError::ContractViolation { step_id,
                                              step_index,
                                              violation: Violation::Replacer(source),
                                              .. } => {
                assert_eq!(step_id, "broken");
                assert_eq!(*step_index, 1);
                assert_eq!(source.message, "cannot replace");
            }
            other => panic!("expected a replacer violation, got {other:?}"),
        }
        assert!(err.step_error().is_none());
        assert_eq!(engine.state(), &Counter::default());
        assert_eq!(engine.processed_signals(), 0);
    }

    #[test]
    fn batch_stops_at_first_failure_and_keeps_completed_work() {
        let pipeline = Pipeline::builder("count_then_reject").step(named("count", count))
                                                             .step(named("reject_odd", reject_odd))
                                                             .build();
        let mut engine = Engine::from_pipeline(pipeline, Counter::default());
        let signals = vec![signal("a", 2), signal("b", 3), signal("c", 4)];

        let err = engine.process_batch(&signals).unwrap_err();

        assert_eq!(err.index, 1);
        assert_eq!(err.signal_id, "b");
        let ids: Vec<&str> = err.completed.iter().map(|e| e.emission_id()).collect();
        assert_eq!(ids, vec!["a:count"]);
        assert_eq!(engine.state().seen, 1);
        assert_eq!(engine.state().last, "a");
    }

    #[test]
    fn empty_pipeline_is_a_no_op() {
        let mut engine: Engine<u32, Counter> = Engine::from_pipeline(Pipeline::new("empty", vec![]), Counter::default());
        assert!(engine.process(&signal("sig", 1)).unwrap().is_empty());
        assert_eq!(engine.state(), &Counter::default());
    }
}
