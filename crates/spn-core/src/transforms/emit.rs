//! `emit` / `emit_if`: la forma más común de step, una emisión por señal.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::model::{Emission, Signal};
use crate::step::{Predicate, Step, StepOutput, StepResult};

type Extractor<P, S> = dyn Fn(&P, &S) -> Value + Send + Sync;
type IdFactory<P, S> = dyn Fn(&Signal<P>, &S) -> String + Send + Sync;
type TimestampFactory<P, S> = dyn Fn(&Signal<P>, &S) -> DateTime<Utc> + Send + Sync;
type Condition<P, S> = dyn Predicate<P, S>;

/// Step que produce exactamente una emisión (o ninguna si tiene condición y
/// ésta es falsa). Nunca devuelve reemplazo de estado.
pub struct Emit<P, S> {
    id: String,
    emission_type: String,
    condition: Option<Arc<Condition<P, S>>>,
    extractor: Arc<Extractor<P, S>>,
    id_factory: Arc<IdFactory<P, S>>,
    timestamp_factory: Arc<TimestampFactory<P, S>>,
    trace: Option<(String, String)>,
}

/// Emisión incondicional. El id del step es el `emission_type`; usar
/// `.named(..)` para cambiarlo.
pub fn emit<P, S, X, I, T>(emission_type: impl Into<String>,
                           payload_extractor: X,
                           emission_id_factory: I,
                           timestamp_factory: T)
                           -> Emit<P, S>
    where X: Fn(&P, &S) -> Value + Send + Sync + 'static,
          I: Fn(&Signal<P>, &S) -> String + Send + Sync + 'static,
          T: Fn(&Signal<P>, &S) -> DateTime<Utc> + Send + Sync + 'static
{
    let emission_type = emission_type.into();
    Emit { id: emission_type.clone(),
           emission_type,
           condition: None,
           extractor: Arc::new(payload_extractor),
           id_factory: Arc::new(emission_id_factory),
           timestamp_factory: Arc::new(timestamp_factory),
           trace: None }
}

/// Igual que `emit` pero sólo cuando `condition(payload, state)` es verdadero.
pub fn emit_if<P, S, C, X, I, T>(condition: C,
                                 emission_type: impl Into<String>,
                                 payload_extractor: X,
                                 emission_id_factory: I,
                                 timestamp_factory: T)
                                 -> Emit<P, S>
    where C: Predicate<P, S> + 'static,
          X: Fn(&P, &S) -> Value + Send + Sync + 'static,
          I: Fn(&Signal<P>, &S) -> String + Send + Sync + 'static,
          T: Fn(&Signal<P>, &S) -> DateTime<Utc> + Send + Sync + 'static
{
    let mut step = emit(emission_type, payload_extractor, emission_id_factory, timestamp_factory);
    step.condition = Some(Arc::new(condition));
    step
}

impl<P, S> Emit<P, S> {
    pub fn named(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Adjunta `metadata.trace` (stage, caused_by, formula) a la emisión.
    pub fn traced(mut self, stage: impl Into<String>, formula: impl Into<String>) -> Self {
        self.trace = Some((stage.into(), formula.into()));
        self
    }
}

impl<P, S> Step<P, S> for Emit<P, S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, signal: &Signal<P>, state: &S) -> StepResult<P, S> {
        if let Some(condition) = &self.condition {
            if !condition(signal.payload(), state) {
                return Ok(StepOutput::none());
            }
        }
        let emission = Emission::new((self.id_factory)(signal, state),
                                     self.emission_type.as_str(),
                                     signal.signal_id(),
                                     (self.timestamp_factory)(signal, state),
                                     (self.extractor)(signal.payload(), state));
        let emission = match &self.trace {
            Some((stage, formula)) => emission.with_trace(stage, formula),
            None => emission,
        };
        Ok(StepOutput::one(emission))
    }
}

/// `"{signal_id}:{suffix}"`.
pub fn suffixed_id<P, S>(suffix: impl Into<String>) -> impl Fn(&Signal<P>, &S) -> String + Send + Sync + 'static
    where P: 'static,
          S: 'static
{
    let suffix = suffix.into();
    move |signal: &Signal<P>, _: &S| format!("{}:{}", signal.signal_id(), suffix)
}

/// El timestamp de la señal.
pub fn signal_timestamp<P, S>() -> impl Fn(&Signal<P>, &S) -> DateTime<Utc> + Send + Sync + 'static
    where P: 'static,
          S: 'static
{
    |signal: &Signal<P>, _: &S| signal.timestamp()
}

/// El timestamp de la señal desplazado en `offset`.
pub fn offset_timestamp<P, S>(offset: Duration) -> impl Fn(&Signal<P>, &S) -> DateTime<Utc> + Send + Sync + 'static
    where P: 'static,
          S: 'static
{
    move |signal: &Signal<P>, _: &S| signal.timestamp() + offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Threshold {
        min: i64,
    }

    fn signal(v: i64) -> Signal<i64> {
        Signal::new("sig_456", Utc.with_ymd_and_hms(2026, 2, 6, 13, 0, 0).unwrap(), "t", v)
    }

    #[test]
    fn emit_uses_factories_and_links_cause() {
        let step = emit("scored",
                        |p: &i64, s: &Threshold| json!({"value": p, "min": s.min}),
                        suffixed_id("score"),
                        offset_timestamp(Duration::seconds(1)));
        let out = step.run(&signal(7), &Threshold { min: 5 }).unwrap();

        assert!(out.update.is_none());
        let e = &out.emissions[0];
        assert_eq!(e.emission_id(), "sig_456:score");
        assert_eq!(e.caused_by(), "sig_456");
        assert_eq!(e.timestamp(), Utc.with_ymd_and_hms(2026, 2, 6, 13, 0, 1).unwrap());
        assert_eq!(e.payload(), &json!({"value": 7, "min": 5}));
        assert!(e.trace().is_none());
    }

    #[test]
    fn emit_if_false_produces_nothing() {
        let step = emit_if(|p: &i64, s: &Threshold| *p >= s.min,
                           "score.high",
                           |p: &i64, _: &Threshold| json!(p),
                           suffixed_id("score_high"),
                           signal_timestamp());
        let state = Threshold { min: 10 };

        let low = step.run(&signal(3), &state).unwrap();
        let high = step.run(&signal(12), &state).unwrap();

        assert!(low.emissions.is_empty() && low.update.is_none() && !low.is_halt());
        assert_eq!(high.emissions[0].emission_id(), "sig_456:score_high");
    }

    #[test]
    fn traced_emission_carries_stage_and_formula() {
        let step = emit("pool", |_: &i64, _: &()| json!({}), suffixed_id("pool"), signal_timestamp())
            .traced("pool_split", "pool * share");
        let out = step.run(&signal(1), &()).unwrap();
        assert_eq!(out.emissions[0].trace(),
                   Some(&json!({"stage": "pool_split", "caused_by": "sig_456", "formula": "pool * share"})));
        assert_eq!(Step::<i64, ()>::id(&step), "pool");
    }
}
