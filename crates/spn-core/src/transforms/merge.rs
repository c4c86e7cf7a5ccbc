use crate::model::Signal;
use crate::step::{Flow, StateUpdate, Step, StepOutput, StepResult};

/// Fan-in de varios sub-steps sobre el mismo estado observado.
///
/// Las emisiones se concatenan en el orden de registro y los reemplazos se
/// componen en ese mismo orden (cada uno observa el estado que dejó el
/// anterior). Si algún sub-step falla, el merge entero falla sin aportar nada.
pub struct Merge<P, S> {
    id: String,
    steps: Vec<Box<dyn Step<P, S>>>,
}

pub fn merge<P, S>(id: impl Into<String>) -> Merge<P, S> {
    Merge { id: id.into(),
            steps: Vec::new() }
}

impl<P, S> Merge<P, S> {
    pub fn with<T>(mut self, step: T) -> Self
        where T: Step<P, S> + 'static
    {
        self.steps.push(Box::new(step));
        self
    }
}

impl<P, S> Step<P, S> for Merge<P, S> where S: 'static
{
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, signal: &Signal<P>, state: &S) -> StepResult<P, S> {
        let mut merged = StepOutput::none();
        let mut update: Option<StateUpdate<S>> = None;

        for step in &self.steps {
            let out = step.run(signal, state)?;
            merged.emissions.extend(out.emissions);
            update = match (update, out.update) {
                (Some(prev), Some(next)) => Some(prev.then(next)),
                (prev, next) => prev.or(next),
            };
            if out.payload.is_some() {
                merged.payload = out.payload;
            }
            if out.flow == Flow::Halt {
                merged.flow = Flow::Halt;
            }
        }

        merged.update = update;
        Ok(merged)
    }
}
