//! Adaptador: cualquier función `(signal, state) -> StepResult` como `Step`.

use super::{Step, StepResult};
use crate::model::Signal;

/// Step respaldado por una función pura con un id explícito.
#[derive(Clone)]
pub struct FnStep<F> {
    id: String,
    f: F,
}

/// Envuelve `f` como step identificado por `id`.
///
/// Las funciones libres (`fn ingest(signal: &Signal<Ev>, state: &St) ->
/// StepResult<Ev, St>`) encajan directamente; para closures conviene anotar
/// los tipos de los parámetros.
pub fn named<F>(id: impl Into<String>, f: F) -> FnStep<F> {
    FnStep { id: id.into(), f }
}

impl<P, S, F> Step<P, S> for FnStep<F> where F: Fn(&Signal<P>, &S) -> StepResult<P, S> + Send + Sync
{
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, signal: &Signal<P>, state: &S) -> StepResult<P, S> {
        (self.f)(signal, state)
    }
}

impl<F> std::fmt::Debug for FnStep<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStep").field("id", &self.id).finish()
    }
}
