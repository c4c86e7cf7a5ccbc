//! Definiciones relacionadas a Steps.
//!
//! Un Step es una función determinista de `(Signal, State)` que produce 0..n
//! emisiones y, opcionalmente, un reemplazo de estado. Este módulo define:
//! - `Step`: interfaz uniforme usada por el engine.
//! - `StepOutput`, `StateUpdate` y `Flow`: la forma del resultado.
//! - `Pipeline`: la secuencia ordenada y compartible de steps.
//! - `named`: adaptador de funciones libres a `Step`.

pub mod definition;
mod fn_step;
pub mod pipeline;
mod run_result;

pub use definition::{Predicate, Step};
pub use fn_step::{named, FnStep};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use run_result::{Flow, StateUpdate, StepOutput, StepResult};
