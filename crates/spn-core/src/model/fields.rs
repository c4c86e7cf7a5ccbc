//! Lectura validada de objetos JSON para `from_value`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{timestamp_format, Metadata};
use crate::errors::SerializationError;

pub(crate) fn as_object(value: &Value) -> Result<&Metadata, SerializationError> {
    value.as_object().ok_or(SerializationError::NotAnObject)
}

pub(crate) fn required<'a>(map: &'a Metadata, key: &'static str) -> Result<&'a Value, SerializationError> {
    map.get(key).ok_or(SerializationError::MissingKey { key })
}

pub(crate) fn required_str(map: &Metadata, key: &'static str) -> Result<String, SerializationError> {
    required(map, key)?.as_str()
                       .map(str::to_string)
                       .ok_or(SerializationError::TypeMismatch { key, expected: "a string" })
}

pub(crate) fn required_timestamp(map: &Metadata, key: &'static str) -> Result<DateTime<Utc>, SerializationError> {
    let raw = required(map, key)?.as_str()
                                 .ok_or(SerializationError::TypeMismatch { key, expected: "an RFC 3339 string" })?;
    timestamp_format::parse(raw).map_err(|e| SerializationError::InvalidTimestamp { value: raw.to_string(),
                                                                                   reason: e.to_string() })
}

pub(crate) fn required_metadata(map: &Metadata, key: &'static str) -> Result<Metadata, SerializationError> {
    required(map, key)?.as_object()
                       .cloned()
                       .ok_or(SerializationError::TypeMismatch { key, expected: "an object" })
}
