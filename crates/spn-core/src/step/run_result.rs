use crate::errors::StepError;
use crate::model::Emission;

/// Resultado de ejecutar un step.
pub type StepResult<P, S> = Result<StepOutput<P, S>, StepError>;

/// Control de flujo solicitado por un step para la señal en curso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Los steps siguientes se ejecutan normalmente.
    #[default]
    Continue,
    /// Los steps restantes del pipeline se omiten para esta señal. Lo ya
    /// emitido y el estado acumulado hasta aquí se conservan.
    Halt,
}

/// Reemplazo de estado: función del estado observado al aplicarse, nunca
/// mutación in-place. El engine calcula el nuevo valor y luego lo intercambia.
pub struct StateUpdate<S> {
    apply: Box<dyn FnOnce(&S) -> Result<S, StepError>>,
}

impl<S: 'static> StateUpdate<S> {
    pub fn new<F>(f: F) -> Self
        where F: FnOnce(&S) -> S + 'static
    {
        Self { apply: Box::new(move |state| Ok(f(state))) }
    }

    /// Reemplazo que puede fallar; el engine lo reporta como violación de
    /// contrato.
    pub fn fallible<F>(f: F) -> Self
        where F: FnOnce(&S) -> Result<S, StepError> + 'static
    {
        Self { apply: Box::new(f) }
    }

    /// Reemplaza el estado por un valor ya calculado.
    pub fn replace(value: S) -> Self {
        Self::new(move |_| value)
    }

    /// Composición secuencial: `next` observa el estado que produjo `self`.
    pub fn then(self, next: StateUpdate<S>) -> Self {
        Self::fallible(move |state| {
            let intermediate = (self.apply)(state)?;
            (next.apply)(&intermediate)
        })
    }
}

impl<S> StateUpdate<S> {
    pub fn apply(self, state: &S) -> Result<S, StepError> {
        (self.apply)(state)
    }
}

impl<S> std::fmt::Debug for StateUpdate<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StateUpdate(..)")
    }
}

/// Salida de un step: emisiones ordenadas, reemplazo de estado opcional,
/// payload reescrito opcional (visible sólo para los steps siguientes de la
/// misma señal) y control de flujo.
#[derive(Debug)]
pub struct StepOutput<P, S> {
    pub emissions: Vec<Emission>,
    pub update: Option<StateUpdate<S>>,
    pub payload: Option<P>,
    pub flow: Flow,
}

impl<P, S> StepOutput<P, S> {
    /// Sin emisiones ni cambios.
    pub fn none() -> Self {
        Self { emissions: Vec::new(),
               update: None,
               payload: None,
               flow: Flow::Continue }
    }

    pub fn emit(emissions: Vec<Emission>) -> Self {
        Self { emissions,
               ..Self::none() }
    }

    pub fn one(emission: Emission) -> Self {
        Self::emit(vec![emission])
    }

    pub fn with_update(mut self, update: StateUpdate<S>) -> Self {
        self.update = Some(update);
        self
    }

    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn halt(mut self) -> Self {
        self.flow = Flow::Halt;
        self
    }

    pub fn is_halt(&self) -> bool {
        self.flow == Flow::Halt
    }
}

impl<P, S: 'static> StepOutput<P, S> {
    /// Atajo para `with_update(StateUpdate::new(f))`.
    pub fn updating<F>(self, f: F) -> Self
        where F: FnOnce(&S) -> S + 'static
    {
        self.with_update(StateUpdate::new(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn then_composes_in_order() {
        let first = StateUpdate::new(|s: &Vec<u32>| {
            let mut next = s.clone();
            next.push(1);
            next
        });
        let second = StateUpdate::new(|s: &Vec<u32>| {
            let mut next = s.clone();
            next.push(s.len() as u32 * 10);
            next
        });
        let out = first.then(second).apply(&vec![]).unwrap();
        assert_eq!(out, vec![1, 10]);
    }

    #[test]
    fn fallible_update_stops_the_chain() {
        let failing = StateUpdate::fallible(|_: &u32| Err(StepError::new("nope")));
        let never = StateUpdate::new(|s: &u32| s + 100);
        assert_eq!(failing.then(never).apply(&1).unwrap_err().message, "nope");
    }
}
