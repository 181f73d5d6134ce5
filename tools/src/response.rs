//! Tagged operation results
//!
//! Every tool call resolves to a value that is explicitly success or error,
//! discriminated by a `status` tag in its serialized form. Operations never
//! surface a raw `Err` to the delegation runtime.

use serde::Serialize;

use td_core::Error;

/// Failure classification carried on every error result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    NoFieldsProvided,
    InvalidInput,
    StorageFailure,
}

/// Error payload: a classification plus a human-readable message
#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub kind: ErrorKind,
    pub error_message: String,
}

impl ToolError {
    /// Convert a store error into an error payload.
    ///
    /// Domain errors already carry a caller-facing message; infrastructure
    /// failures get the operation-specific `context` prefixed.
    pub fn from_store(context: &str, err: Error) -> Self {
        match err {
            Error::TaskNotFound(_) => Self {
                kind: ErrorKind::NotFound,
                error_message: err.to_string(),
            },
            Error::NoFieldsProvided => Self {
                kind: ErrorKind::NoFieldsProvided,
                error_message: err.to_string(),
            },
            Error::InvalidInput(_) => Self {
                kind: ErrorKind::InvalidInput,
                error_message: err.to_string(),
            },
            other => Self {
                kind: ErrorKind::StorageFailure,
                error_message: format!("{}: {}", context, other),
            },
        }
    }
}

/// Result of a tool invocation
///
/// Serializes as `{"status": "success", ...payload}` or
/// `{"status": "error", "kind": ..., "error_message": ...}`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResult<T> {
    Success(T),
    Error(ToolError),
}

impl<T> ToolResult<T> {
    /// Build an error result in place
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error(ToolError {
            kind,
            error_message: message.into(),
        })
    }

    /// True if this is the success variant
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
