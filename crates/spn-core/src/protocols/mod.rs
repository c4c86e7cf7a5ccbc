//! Capacidades de borde: de dónde vienen las señales y a dónde van las
//! emisiones. Sólo el orquestador (`drive`) las usa; `Engine` y `Pipeline` no
//! dependen de este módulo.

mod game;
mod sink;
mod source;

pub use game::{drive, DriveError, DriveReport, GameProtocol};
pub use sink::{EmissionSink, MemorySink};
pub use source::{IterSource, SignalSource, Signals};
