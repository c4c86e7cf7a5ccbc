use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

use super::{EmissionSink, SignalSource};
use crate::engine::Engine;
use crate::errors::RuntimeError;
use crate::step::Pipeline;

/// Conjunto de capacidades que conecta un pipeline concreto con su fuente de
/// señales y su sink. Es el punto donde se engancha la lógica de dominio; el
/// engine no conoce este trait.
pub trait GameProtocol {
    type Payload;
    type State;
    type Source: SignalSource<Self::Payload>;
    type Sink: EmissionSink;

    fn pipeline(&self) -> Arc<Pipeline<Self::Payload, Self::State>>;

    fn initial_state(&self) -> Self::State;

    fn source(&mut self) -> Self::Source;

    fn sink(&mut self) -> &mut Self::Sink;
}

#[derive(Debug, Error)]
pub enum DriveError<E>
    where E: std::error::Error + 'static
{
    #[error("runtime error after {processed} signal(s): {source}")]
    Runtime {
        processed: u64,
        #[source]
        source: RuntimeError,
    },
    #[error("sink rejected emissions of signal `{signal_id}`: {source}")]
    Sink {
        signal_id: String,
        #[source]
        source: E,
    },
}

/// Resumen de una corrida completa de `drive`.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveReport<S> {
    pub signals: u64,
    pub emissions: usize,
    pub state: S,
}

type DriveResult<G> = Result<DriveReport<<G as GameProtocol>::State>,
                             DriveError<<<G as GameProtocol>::Sink as EmissionSink>::Error>>;

/// Orquestador mínimo: crea un `Engine` desde el protocolo, consume la fuente
/// señal por señal y entrega cada lote de emisiones al sink. Se detiene en el
/// primer error (runtime o sink).
pub fn drive<G>(protocol: &mut G) -> DriveResult<G>
    where G: GameProtocol
{
    let pipeline = protocol.pipeline();
    info!("driving pipeline `{}` ({} steps)", pipeline.name(), pipeline.len());
    let mut engine = Engine::new(pipeline, protocol.initial_state());
    let mut source = protocol.source();
    let mut emitted = 0usize;

    while let Some(signal) = source.next_signal() {
        let emissions = engine.process(&signal)
                              .map_err(|err| DriveError::Runtime { processed: engine.processed_signals(),
                                                                   source: err })?;
        if let Err(err) = protocol.sink().accept(&emissions) {
            warn!("sink rejected {} emission(s) of signal `{}`: {}",
                  emissions.len(),
                  signal.signal_id(),
                  err);
            return Err(DriveError::Sink { signal_id: signal.signal_id().to_string(),
                                          source: err });
        }
        emitted += emissions.len();
    }

    let signals = engine.processed_signals();
    info!("pipeline `{}` finished: {} signal(s), {} emission(s)",
          engine.pipeline().name(),
          signals,
          emitted);
    Ok(DriveReport { signals,
                     emissions: emitted,
                     state: engine.into_state() })
}
