//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Dispatch
//! converts every variant into a structured outcome, so the `Display` text is
//! what operators end up reading.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the tool server.
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown tool, component, or method on a component.
    #[error("not found: {0}")]
    NotFound(String),

    /// A non-empty raw argument is not valid text for its numeric type.
    #[error("parse error: {0}")]
    Parse(String),

    /// A raw argument does not name a member of the declared enumeration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The invoked tool itself failed; carries the cause text.
    #[error("tool invocation failed: {0}")]
    Invocation(String),

    /// A component could not produce its tool table.
    #[error("scan failed: {0}")]
    Scan(String),

    /// Malformed request at the transport boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// Status page template errors.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// JSON-RPC 2.0 error code for the remote tool-call protocol.
    pub fn rpc_code(&self) -> i64 {
        match self {
            Error::NotFound(_) => -32601,
            Error::Parse(_) | Error::InvalidArgument(_) | Error::Validation(_) => -32602,
            _ => -32603,
        }
    }

    /// HTTP status for errors that reach a plain HTTP handler.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Parse(_) | Error::InvalidArgument(_) | Error::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invocation(msg: impl Into<String>) -> Self {
        Self::Invocation(msg.into())
    }

    pub fn scan(msg: impl Into<String>) -> Self {
        Self::Scan(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({
            "success": false,
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
