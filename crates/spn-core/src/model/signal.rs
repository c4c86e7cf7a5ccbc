//! `Signal<P>`: sobre de entrada inmutable.
//!
//! Todos los campos los asigna quien construye la señal (id, timestamp,
//! source); el runtime nunca genera ids ni lee el reloj. Una vez construida la
//! señal sólo se expone por referencia compartida.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::fields::{as_object, required, required_metadata, required_str, required_timestamp};
use super::{timestamp_format, Metadata};
use crate::errors::SerializationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal<P> {
    signal_id: String,
    #[serde(with = "timestamp_format")]
    timestamp: DateTime<Utc>,
    source: String,
    payload: P,
    #[serde(default)]
    metadata: Metadata,
}

impl<P> Signal<P> {
    pub fn new(signal_id: impl Into<String>, timestamp: DateTime<Utc>, source: impl Into<String>, payload: P) -> Self {
        Self { signal_id: signal_id.into(),
               timestamp,
               source: source.into(),
               payload,
               metadata: Metadata::new() }
    }

    /// Reemplaza la metadata completa (consumiendo la señal en construcción).
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn signal_id(&self) -> &str {
        &self.signal_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Copia de la señal (mismo id, timestamp, source y metadata) con otro
    /// payload. La usa el engine cuando un Step reescribe el payload para los
    /// Steps siguientes.
    pub fn with_payload(&self, payload: P) -> Signal<P> {
        Signal { signal_id: self.signal_id.clone(),
                 timestamp: self.timestamp,
                 source: self.source.clone(),
                 payload,
                 metadata: self.metadata.clone() }
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Serializa al mapa plano `signal_id, timestamp, source, payload, metadata`.
    pub fn to_value(&self) -> Result<Value, SerializationError>
        where P: Serialize
    {
        let payload = serde_json::to_value(&self.payload).map_err(|e| SerializationError::Encode(e.to_string()))?;
        Ok(json!({
            "signal_id": self.signal_id,
            "timestamp": timestamp_format::format(&self.timestamp),
            "source": self.source,
            "payload": payload,
            "metadata": self.metadata,
        }))
    }

    /// Reconstruye una señal; `payload_factory` recibe el payload serializado.
    pub fn from_value<F>(value: &Value, payload_factory: F) -> Result<Self, SerializationError>
        where F: FnOnce(Value) -> P
    {
        Self::try_from_value(value, |raw| Ok(payload_factory(raw)))
    }

    /// Variante de `from_value` cuya factory puede rechazar el payload.
    pub fn try_from_value<F>(value: &Value, payload_factory: F) -> Result<Self, SerializationError>
        where F: FnOnce(Value) -> Result<P, SerializationError>
    {
        let map = as_object(value)?;
        let signal_id = required_str(map, "signal_id")?;
        let timestamp = required_timestamp(map, "timestamp")?;
        let source = required_str(map, "source")?;
        let raw_payload = required(map, "payload")?.clone();
        let metadata = required_metadata(map, "metadata")?;
        let payload = payload_factory(raw_payload)?;
        Ok(Self { signal_id,
                  timestamp,
                  source,
                  payload,
                  metadata })
    }

    /// Reconstruye deserializando el payload con serde.
    pub fn from_value_as(value: &Value) -> Result<Self, SerializationError>
        where P: DeserializeOwned
    {
        Self::try_from_value(value, |raw| {
            serde_json::from_value(raw).map_err(|e| SerializationError::Payload(e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 6, 10, 0, 0).unwrap()
    }

    #[test]
    fn to_value_has_the_five_contract_keys() {
        let signal = Signal::new("sig_1", ts(), "ingestor", json!({"score": 1}));
        let value = signal.to_value().unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["metadata", "payload", "signal_id", "source", "timestamp"]);
        assert_eq!(value["timestamp"], json!("2026-02-06T10:00:00Z"));
    }

    #[test]
    fn from_value_reports_missing_and_mistyped_keys() {
        let missing = json!({"signal_id": "s", "timestamp": "2026-02-06T10:00:00Z", "payload": {}, "metadata": {}});
        let err = Signal::<Value>::from_value(&missing, |p| p).unwrap_err();
        assert_eq!(err, SerializationError::MissingKey { key: "source" });

        let mistyped = json!({"signal_id": 7, "timestamp": "2026-02-06T10:00:00Z", "source": "x", "payload": {}, "metadata": {}});
        let err = Signal::<Value>::from_value(&mistyped, |p| p).unwrap_err();
        assert_eq!(err, SerializationError::TypeMismatch { key: "signal_id", expected: "a string" });

        let bad_ts = json!({"signal_id": "s", "timestamp": "yesterday", "source": "x", "payload": {}, "metadata": {}});
        assert!(matches!(Signal::<Value>::from_value(&bad_ts, |p| p),
                         Err(SerializationError::InvalidTimestamp { .. })));
    }

    #[test]
    fn with_payload_keeps_identity() {
        let signal = Signal::new("sig_1", ts(), "src", 1_u32).with_metadata_entry("trace_id", json!("tr"));
        let reshaped = signal.with_payload(2_u32);
        assert_eq!(reshaped.signal_id(), "sig_1");
        assert_eq!(reshaped.metadata(), signal.metadata());
        assert_eq!(*reshaped.payload(), 2);
    }
}
