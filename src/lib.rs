//! spn-engine: fachada del workspace.
//!
//! Re-exporta el runtime (`spn-core`) en la raíz y los pipelines de
//! referencia bajo `reference`, para que los clientes dependan de un único
//! crate.

pub use spn_core::*;
pub use spn_reference as reference;
