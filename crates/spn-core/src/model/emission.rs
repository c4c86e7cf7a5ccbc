//! `Emission`: registro de salida inmutable, ligado causalmente a la señal que
//! lo produjo mediante `caused_by`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::fields::{as_object, required, required_metadata, required_str, required_timestamp};
use super::{timestamp_format, Metadata, Signal};
use crate::constants::TRACE_KEY;
use crate::errors::SerializationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    emission_id: String,
    emission_type: String,
    caused_by: String,
    #[serde(with = "timestamp_format")]
    timestamp: DateTime<Utc>,
    payload: Value,
    #[serde(default)]
    metadata: Metadata,
}

impl Emission {
    pub fn new(emission_id: impl Into<String>,
               emission_type: impl Into<String>,
               caused_by: impl Into<String>,
               timestamp: DateTime<Utc>,
               payload: Value)
               -> Self {
        Self { emission_id: emission_id.into(),
               emission_type: emission_type.into(),
               caused_by: caused_by.into(),
               timestamp,
               payload,
               metadata: Metadata::new() }
    }

    /// Emisión derivada de `signal`: id `"{signal_id}:{suffix}"`, mismo
    /// timestamp que la señal y `caused_by` apuntando a ella.
    pub fn derived<P>(signal: &Signal<P>, suffix: &str, emission_type: impl Into<String>, payload: Value) -> Self {
        Self::new(format!("{}:{}", signal.signal_id(), suffix),
                  emission_type,
                  signal.signal_id(),
                  signal.timestamp(),
                  payload)
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Adjunta el sub-registro de auditoría `trace` (stage, caused_by, formula).
    pub fn with_trace(self, stage: &str, formula: &str) -> Self {
        let trace = json!({
            "stage": stage,
            "caused_by": self.caused_by,
            "formula": formula,
        });
        self.with_metadata_entry(TRACE_KEY, trace)
    }

    pub fn emission_id(&self) -> &str {
        &self.emission_id
    }

    pub fn emission_type(&self) -> &str {
        &self.emission_type
    }

    pub fn caused_by(&self) -> &str {
        &self.caused_by
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn trace(&self) -> Option<&Value> {
        self.metadata.get(TRACE_KEY)
    }

    /// Mapa plano `emission_id, emission_type, caused_by, timestamp, payload, metadata`.
    pub fn to_value(&self) -> Value {
        json!({
            "emission_id": self.emission_id,
            "emission_type": self.emission_type,
            "caused_by": self.caused_by,
            "timestamp": timestamp_format::format(&self.timestamp),
            "payload": self.payload,
            "metadata": self.metadata,
        })
    }

    pub fn from_value(value: &Value) -> Result<Self, SerializationError> {
        let map = as_object(value)?;
        Ok(Self { emission_id: required_str(map, "emission_id")?,
                  emission_type: required_str(map, "emission_type")?,
                  caused_by: required_str(map, "caused_by")?,
                  timestamp: required_timestamp(map, "timestamp")?,
                  payload: required(map, "payload")?.clone(),
                  metadata: required_metadata(map, "metadata")? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn derived_emission_points_back_to_signal() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 7, 12, 0, 0).unwrap();
        let signal = Signal::new("sig_m4_1", ts, "ops", ());
        let emission = Emission::derived(&signal, "attention", "m4.rewards.attention.computed", json!({}))
            .with_trace("attention_share", "a / sum(a)");

        assert_eq!(emission.emission_id(), "sig_m4_1:attention");
        assert_eq!(emission.caused_by(), "sig_m4_1");
        assert_eq!(emission.timestamp(), ts);
        assert_eq!(emission.trace().unwrap()["caused_by"], json!("sig_m4_1"));
        assert_eq!(emission.trace().unwrap()["stage"], json!("attention_share"));
    }

    #[test]
    fn value_round_trip_is_structurally_equal() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 7, 12, 0, 0).unwrap() + chrono::Duration::milliseconds(250);
        let emission = Emission::new("e1", "t", "sig", ts, json!({"ranked": ["a", "b"]}))
            .with_metadata_entry("k", json!(1));
        let restored = Emission::from_value(&emission.to_value()).unwrap();
        assert_eq!(restored, emission);
    }

    #[test]
    fn serde_and_to_value_agree() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 7, 12, 0, 0).unwrap();
        let emission = Emission::new("e1", "t", "sig", ts, json!(null));
        assert_eq!(serde_json::to_value(&emission).unwrap(), emission.to_value());
    }
}
