//! Core Engine implementation

use std::sync::Arc;

use log::{debug, trace, warn};
use uuid::Uuid;

use crate::errors::{BatchError, RuntimeError, Violation};
use crate::model::{Emission, Signal};
use crate::step::{Flow, Pipeline, StepOutput};

/// Motor de ejecución determinista.
///
/// Liga un `Pipeline` compartido a un único estado vivo y procesa señales a
/// través de él. Es single-writer: `process` toma `&mut self`, así que el
/// borrow checker descarta el uso concurrente de una misma instancia. Para
/// paralelizar, cada worker crea su propio `Engine` sobre el mismo
/// `Arc<Pipeline>`.
pub struct Engine<P, S> {
    id: Uuid,
    pipeline: Arc<Pipeline<P, S>>,
    state: S,
    processed: u64,
}

impl<P, S> Engine<P, S> {
    /// Crea un engine con el estado inicial dado.
    pub fn new(pipeline: Arc<Pipeline<P, S>>, initial_state: S) -> Self {
        let id = Uuid::new_v4();
        debug!("engine {} created over pipeline `{}` ({} steps)",
               id,
               pipeline.name(),
               pipeline.len());
        Self { id,
               pipeline,
               state: initial_state,
               processed: 0 }
    }

    /// Atajo cuando el pipeline no se comparte.
    pub fn from_pipeline(pipeline: Pipeline<P, S>, initial_state: S) -> Self {
        Self::new(Arc::new(pipeline), initial_state)
    }

    /// Identificador de instancia (sólo para logs; nunca entra en emisiones).
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn pipeline(&self) -> &Arc<Pipeline<P, S>> {
        &self.pipeline
    }

    /// Estado persistido actual. El préstamo compartido impide corromper el
    /// estado interno desde fuera.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Copia independiente del estado persistido.
    pub fn snapshot(&self) -> S
        where S: Clone
    {
        self.state.clone()
    }

    /// Consume el engine y devuelve el estado final.
    pub fn into_state(self) -> S {
        self.state
    }

    /// Cantidad de señales confirmadas por esta instancia.
    pub fn processed_signals(&self) -> u64 {
        self.processed
    }

    /// Ejecuta el pipeline completo para una señal.
    ///
    /// Cada step observa el estado producido por el anterior. El estado de
    /// trabajo sólo se confirma si todos los steps terminan bien: ante
    /// cualquier error el estado persistido queda igual que antes de la
    /// llamada y no se devuelven emisiones.
    pub fn process(&mut self, signal: &Signal<P>) -> Result<Vec<Emission>, RuntimeError> {
        let pipeline = Arc::clone(&self.pipeline);
        let mut emissions: Vec<Emission> = Vec::new();
        let mut working: Option<S> = None;
        let mut reshaped: Option<Signal<P>> = None;

        for (step_index, step) in pipeline.steps().iter().enumerate() {
            let current_signal = reshaped.as_ref().unwrap_or(signal);
            let current_state = working.as_ref().unwrap_or(&self.state);
            trace!("engine {} running step `{}` (#{}) on signal `{}`",
                   self.id,
                   step.id(),
                   step_index,
                   signal.signal_id());

            let output = step.run(current_signal, current_state).map_err(|source| {
                warn!("step `{}` of pipeline `{}` failed on signal `{}`: {}",
                      step.id(),
                      pipeline.name(),
                      signal.signal_id(),
                      source);
                RuntimeError::StepExecution { pipeline: pipeline.name().to_string(),
                                              step_index,
                                              step_id: step.id().to_string(),
                                              signal_id: signal.signal_id().to_string(),
                                              source }
            })?;
            let StepOutput { emissions: produced,
                             update,
                             payload,
                             flow } = output;

            let violation = |violation: Violation| {
                warn!("contract violation in step `{}` of pipeline `{}` on signal `{}`: {}",
                      step.id(),
                      pipeline.name(),
                      signal.signal_id(),
                      violation);
                RuntimeError::ContractViolation { pipeline: pipeline.name().to_string(),
                                                  step_index,
                                                  step_id: step.id().to_string(),
                                                  signal_id: signal.signal_id().to_string(),
                                                  violation }
            };

            if let Some(foreign) = produced.iter().find(|e| e.caused_by() != signal.signal_id()) {
                return Err(violation(Violation::ForeignCause { emission_id: foreign.emission_id().to_string(),
                                                               caused_by: foreign.caused_by().to_string() }));
            }

            let next_state = match update {
                Some(update) => Some(update.apply(current_state)
                                           .map_err(|e| violation(Violation::Replacer(e)))?),
                None => None,
            };
            let next_signal = payload.map(|p| current_signal.with_payload(p));

            emissions.extend(produced);
            if next_state.is_some() {
                working = next_state;
            }
            if next_signal.is_some() {
                reshaped = next_signal;
            }

            if flow == Flow::Halt {
                debug!("step `{}` halted signal `{}`; skipping {} remaining step(s)",
                       step.id(),
                       signal.signal_id(),
                       pipeline.len() - step_index - 1);
                break;
            }
        }

        if let Some(state) = working {
            self.state = state;
        }
        self.processed += 1;
        debug!("engine {} processed signal `{}` through `{}`: {} emission(s)",
               self.id,
               signal.signal_id(),
               pipeline.name(),
               emissions.len());
        Ok(emissions)
    }

    /// Procesa señales en orden, arrastrando el estado entre ellas.
    ///
    /// Fail-fast: ante el primer error se detiene. Las señales previas quedan
    /// confirmadas y sus emisiones viajan en `BatchError::completed`.
    pub fn process_batch<'a, I>(&mut self, signals: I) -> Result<Vec<Emission>, BatchError>
        where I: IntoIterator<Item = &'a Signal<P>>,
              P: 'a
    {
        let mut out: Vec<Emission> = Vec::new();
        for (index, signal) in signals.into_iter().enumerate() {
            match self.process(signal) {
                Ok(emissions) => out.extend(emissions),
                Err(source) => {
                    return Err(BatchError { index,
                                            signal_id: signal.signal_id().to_string(),
                                            completed: out,
                                            source })
                }
            }
        }
        Ok(out)
    }
}

impl<P, S> std::fmt::Debug for Engine<P, S>
    where S: std::fmt::Debug
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
         .field("id", &self.id)
         .field("pipeline", &self.pipeline.name())
         .field("state", &self.state)
         .field("processed", &self.processed)
         .finish()
    }
}
