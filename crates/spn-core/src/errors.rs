//! Errores del runtime.
//!
//! - `SerializationError`: JSON mal formado entregado a `from_value`.
//! - `StepError`: lo que un Step devuelve para indicar fallo.
//! - `RuntimeError`: fallo de un `Engine::process` (step o contrato).
//! - `BatchError`: fallo fail-fast de `Engine::process_batch` con resultados
//!   parciales de las señales ya completadas.

use serde_json::Value;
use thiserror::Error;

use crate::model::Emission;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("expected a JSON object")] NotAnObject,
    #[error("missing required key `{key}`")] MissingKey { key: &'static str },
    #[error("key `{key}` must be {expected}")] TypeMismatch { key: &'static str, expected: &'static str },
    #[error("invalid timestamp `{value}`: {reason}")] InvalidTimestamp { value: String, reason: String },
    #[error("payload decode failed: {0}")] Payload(String),
    #[error("payload encode failed: {0}")] Encode(String),
}

/// Fallo reportado por un Step. El engine no lo interpreta: lo envuelve con
/// el contexto de ejecución y lo propaga tal cual.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct StepError {
    pub message: String,
    /// Detalle estructurado opcional (no afecta `Display`).
    pub detail: Option<Value>,
}

impl StepError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(),
               detail: None }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Contratos que el engine verifica sobre el resultado de cada Step.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Violation {
    #[error("emission `{emission_id}` is caused by `{caused_by}` instead of the processed signal")]
    ForeignCause { emission_id: String, caused_by: String },
    #[error("state replacer failed: {0}")]
    Replacer(StepError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("step `{step_id}` (#{step_index}) of pipeline `{pipeline}` failed on signal `{signal_id}`: {source}")]
    StepExecution {
        pipeline: String,
        step_index: usize,
        step_id: String,
        signal_id: String,
        #[source]
        source: StepError,
    },
    #[error("contract violation in step `{step_id}` (#{step_index}) of pipeline `{pipeline}` on signal `{signal_id}`: {violation}")]
    ContractViolation {
        pipeline: String,
        step_index: usize,
        step_id: String,
        signal_id: String,
        violation: Violation,
    },
}

impl RuntimeError {
    /// Error original del Step cuando el fallo vino de su ejecución.
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            RuntimeError::StepExecution { source, .. } => Some(source),
            RuntimeError::ContractViolation { .. } => None,
        }
    }

    pub fn step_id(&self) -> &str {
        match self {
            RuntimeError::StepExecution { step_id, .. } | RuntimeError::ContractViolation { step_id, .. } => step_id,
        }
    }

    pub fn step_index(&self) -> usize {
        match self {
            RuntimeError::StepExecution { step_index, .. } | RuntimeError::ContractViolation { step_index, .. } => {
                *step_index
            }
        }
    }

    pub fn signal_id(&self) -> &str {
        match self {
            RuntimeError::StepExecution { signal_id, .. } | RuntimeError::ContractViolation { signal_id, .. } => {
                signal_id
            }
        }
    }
}

/// Fallo de un batch. Las señales previas a `index` quedaron confirmadas
/// (estado + emisiones en `completed`); la señal fallida no dejó rastro y las
/// posteriores no se procesaron.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("batch aborted at signal #{index} (`{signal_id}`): {source}")]
pub struct BatchError {
    pub index: usize,
    pub signal_id: String,
    pub completed: Vec<Emission>,
    #[source]
    pub source: RuntimeError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_execution_display_names_step_and_signal() {
        let err = RuntimeError::StepExecution { pipeline: "p".into(),
                                                step_index: 2,
                                                step_id: "resolve".into(),
                                                signal_id: "sig_1".into(),
                                                source: StepError::new("boom") };
        assert_eq!(err.to_string(),
                   "step `resolve` (#2) of pipeline `p` failed on signal `sig_1`: boom");
        assert_eq!(err.step_error().map(|e| e.message.as_str()), Some("boom"));
        assert_eq!(err.signal_id(), "sig_1");
    }

    #[test]
    fn contract_violation_has_no_step_error() {
        let err = RuntimeError::ContractViolation { pipeline: "p".into(),
                                                    step_index: 0,
                                                    step_id: "emit".into(),
                                                    signal_id: "sig_1".into(),
                                                    violation: Violation::ForeignCause { emission_id: "e".into(),
                                                                                         caused_by: "other".into() } };
        assert!(err.step_error().is_none());
        assert!(err.to_string().contains("caused by `other`"));
    }
}
