//! Modelos neutrales del runtime (Signal, Emission, Metadata).
//!
//! El runtime no interpreta `payload` ni `metadata`: sólo los transporta y los
//! serializa con un contrato estable (ver `Signal::to_value` /
//! `Emission::to_value`).

pub mod emission;
pub mod signal;
pub(crate) mod fields;

pub use emission::Emission;
pub use signal::Signal;

/// Mapa string -> JSON. `serde_json::Map` sin `preserve_order` mantiene las
/// claves ordenadas, lo que hace la serialización estable byte a byte.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Formato de timestamp del contrato de serialización (RFC 3339, UTC, con la
/// precisión sub-segundo mínima que no pierde información).
pub mod timestamp_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
