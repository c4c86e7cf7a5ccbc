//! Módulo de hashing y canonicalización JSON.
//!
//! Sostiene los tests de determinismo y replay: dos ejecuciones equivalentes
//! producen exactamente la misma huella sobre sus emisiones serializadas.

pub mod canonical_json;
pub mod hash;

pub use canonical_json::to_canonical_json;
pub use hash::{fingerprint_emissions, hash_str, hash_value};
