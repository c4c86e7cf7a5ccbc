use std::sync::Arc;

use super::StateLens;
use crate::model::Signal;
use crate::step::{StateUpdate, Step, StepOutput, StepResult};

/// Step que pliega el payload sobre un agregado del estado (conteos, sumas).
///
/// El fold se evalúa dentro del `StateUpdate`, es decir contra el estado que
/// observa el engine al aplicar el reemplazo. No emite nada.
pub struct Accumulate<S, A, P> {
    id: String,
    lens: StateLens<S, A>,
    fold: Arc<dyn Fn(&A, &P) -> A + Send + Sync>,
}

pub fn accumulate<S, A, P, F>(id: impl Into<String>, lens: StateLens<S, A>, fold: F) -> Accumulate<S, A, P>
    where F: Fn(&A, &P) -> A + Send + Sync + 'static
{
    Accumulate { id: id.into(),
                 lens,
                 fold: Arc::new(fold) }
}

impl<P, S, A> Step<P, S> for Accumulate<S, A, P>
    where P: Clone + 'static,
          S: 'static,
          A: 'static
{
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, signal: &Signal<P>, _state: &S) -> StepResult<P, S> {
        let lens = self.lens.clone();
        let fold = Arc::clone(&self.fold);
        let payload = signal.payload().clone();
        let update = StateUpdate::new(move |state: &S| {
            let next = fold(lens.get(state), &payload);
            lens.set(state, next)
        });
        Ok(StepOutput::none().with_update(update))
    }
}
