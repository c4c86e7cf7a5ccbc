use crate::model::Signal;
use crate::step::{Predicate, Step, StepOutput, StepResult};

/// Step que reescribe el payload para los steps siguientes de la misma señal.
pub struct MapSignal<F> {
    id: String,
    transform: F,
}

pub fn map_signal<F>(id: impl Into<String>, transform: F) -> MapSignal<F> {
    MapSignal { id: id.into(),
                transform }
}

impl<P, S, F> Step<P, S> for MapSignal<F> where F: Fn(&P, &S) -> P + Send + Sync
{
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, signal: &Signal<P>, state: &S) -> StepResult<P, S> {
        Ok(StepOutput::none().with_payload((self.transform)(signal.payload(), state)))
    }
}

/// Step que corta el pipeline (`Flow::Halt`) cuando el predicado es falso.
pub struct FilterSignal<F> {
    id: String,
    predicate: F,
}

pub fn filter_signal<F>(id: impl Into<String>, predicate: F) -> FilterSignal<F> {
    FilterSignal { id: id.into(),
                   predicate }
}

impl<P, S, F> Step<P, S> for FilterSignal<F> where F: Predicate<P, S>
{
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, signal: &Signal<P>, state: &S) -> StepResult<P, S> {
        if (self.predicate)(signal.payload(), state) {
            Ok(StepOutput::none())
        } else {
            Ok(StepOutput::none().halt())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::model::Emission;
    use crate::step::{named, Pipeline};
    use crate::transforms::{accumulate, StateLens};
    use chrono::Utc;
    use serde_json::json;

    fn echo(signal: &Signal<i64>, _state: &()) -> StepResult<i64, ()> {
        Ok(StepOutput::one(Emission::derived(signal, "echo", "echo", json!(signal.payload()))))
    }

    #[test]
    fn map_is_visible_downstream_only() {
        let pipeline = Pipeline::builder("double").step(map_signal("double", |p: &i64, _: &()| p * 2))
                                                  .step(named("echo", echo))
                                                  .build();
        let mut engine = Engine::from_pipeline(pipeline, ());
        let signal = Signal::new("s", Utc::now(), "t", 21);

        let out = engine.process(&signal).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload(), &json!(42));
        assert_eq!(*signal.payload(), 21);
    }

    #[test]
    fn filter_halts_remaining_steps() {
        let pipeline = Pipeline::builder("positive").step(filter_signal("positive", |p: &i64, _: &()| *p > 0))
                                                    .step(named("echo", echo))
                                                    .build();
        let mut engine = Engine::from_pipeline(pipeline, ());

        let kept = engine.process(&Signal::new("a", Utc::now(), "t", 5)).unwrap();
        let dropped = engine.process(&Signal::new("b", Utc::now(), "t", -5)).unwrap();

        assert_eq!(kept.len(), 1);
        assert!(dropped.is_empty());
        assert_eq!(engine.processed_signals(), 2);
    }

    #[test]
    fn halt_still_commits_state_built_before_the_filter() {
        fn tally(signal: &Signal<i64>, total: &i64) -> StepResult<i64, i64> {
            Ok(StepOutput::one(Emission::derived(signal, "tally", "tally", json!(total))))
        }
        let pipeline = Pipeline::builder("sum_then_filter")
            .step(accumulate("sum", StateLens::identity(), |acc: &i64, p: &i64| acc + p))
            .step(filter_signal("positive", |p: &i64, _: &i64| *p > 0))
            .step(named("tally", tally))
            .build();
        let mut engine = Engine::from_pipeline(pipeline, 10_i64);

        let out = engine.process(&Signal::new("neg", Utc::now(), "t", -3)).unwrap();

        assert!(out.is_empty());
        assert_eq!(*engine.state(), 7);
        assert_eq!(engine.processed_signals(), 1);
    }
}
