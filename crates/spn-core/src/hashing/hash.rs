//! Hash helpers – abstracción para permitir cambiar de algoritmo sin tocar el
//! resto del runtime.

use blake3::Hasher;
use serde_json::{json, Value};

use super::to_canonical_json;
use crate::constants::ENGINE_VERSION;
use crate::model::Emission;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hash del JSON canónico de `value`.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// Huella de una lista ordenada de emisiones. El orden participa en el hash:
/// reordenar emisiones cambia la huella.
pub fn fingerprint_emissions(emissions: &[Emission]) -> String {
    let serialized: Vec<Value> = emissions.iter().map(Emission::to_value).collect();
    hash_value(&json!({
        "engine_version": ENGINE_VERSION,
        "emissions": serialized,
    }))
}
