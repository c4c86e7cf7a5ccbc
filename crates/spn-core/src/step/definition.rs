use crate::model::Signal;

use super::run_result::StepResult;

/// Trait que define un Step. Implementaciones deben ser puras respecto a
/// `(signal, state)`: re-ejecutarlas con los mismos inputs produce los mismos
/// outputs (requisito de los tests golden/replay).
///
/// `Send + Sync` permite compartir un `Pipeline` entre varios `Engine`.
pub trait Step<P, S>: Send + Sync {
    /// Identificador estable dentro del pipeline (logs y errores).
    fn id(&self) -> &str;

    /// Ejecución pura del step sobre la señal y el estado actual.
    fn run(&self, signal: &Signal<P>, state: &S) -> StepResult<P, S>;
}

impl<P, S> Step<P, S> for Box<dyn Step<P, S>> {
    fn id(&self) -> &str {
        self.as_ref().id()
    }

    fn run(&self, signal: &Signal<P>, state: &S) -> StepResult<P, S> {
        self.as_ref().run(signal, state)
    }
}

/// Función pura `(payload, state) -> bool`. Puede evaluarse varias veces por
/// llamada, por lo que no debe tener efectos secundarios.
pub trait Predicate<P, S>: Fn(&P, &S) -> bool + Send + Sync {}

impl<P, S, F> Predicate<P, S> for F where F: Fn(&P, &S) -> bool + Send + Sync {}
