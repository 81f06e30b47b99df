//! Error types for decoding backend payloads

use thiserror::Error;

/// Failure to map a JSON payload onto the shape an endpoint promises.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("Expected a JSON {expected} for {shape:?} list, found {found}")]
    UnexpectedShape {
        shape: crate::ListShape,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Missing field '{field}' in list envelope")]
    MissingField { field: &'static str },

    #[error("Invalid item in response: {reason}")]
    InvalidItem { reason: String },
}

impl EnvelopeError {
    pub(crate) fn invalid(err: serde_json::Error) -> Self {
        EnvelopeError::InvalidItem {
            reason: err.to_string(),
        }
    }
}

/// Name of a JSON value's kind, for error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
