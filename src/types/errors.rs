//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Each
//! variant maps to a stable [`ErrorKind`] so the outward surfaces can carry
//! the kind next to the human-readable message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the bridge.
#[derive(Error, Debug)]
pub enum Error {
    /// A partner credential could not be obtained or was rejected.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// The partner answered but signaled failure.
    #[error("partner API error {code}: {message}")]
    RemoteApi { code: i64, message: String },

    /// Network/HTTP-level failure reaching the partner.
    #[error("transport error: {0}")]
    Transport(String),

    /// No handler is registered under the invoked name.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments rejected before any remote call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Inbound caller credential missing or wrong.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Unknown service or method on the request/response surface.
    #[error("not found: {0}")]
    NotFound(String),

    /// Anything else, including handler panics.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    AuthFailure,
    RemoteApiError,
    TransportFailure,
    UnknownTool,
    Validation,
    Unauthorized,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// Stable code string used on the wire.
    pub fn as_code(&self) -> &'static str {
        match self {
            ErrorKind::AuthFailure => "AUTH_FAILURE",
            ErrorKind::RemoteApiError => "REMOTE_API_ERROR",
            ErrorKind::TransportFailure => "TRANSPORT_FAILURE",
            ErrorKind::UnknownTool => "UNKNOWN_TOOL",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AuthFailure(_) => ErrorKind::AuthFailure,
            Error::RemoteApi { .. } => ErrorKind::RemoteApiError,
            Error::Transport(_) => ErrorKind::TransportFailure,
            Error::UnknownTool(_) => ErrorKind::UnknownTool,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Internal(_) | Error::Serialization(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Partner-supplied code, when the partner signaled the failure.
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            Error::RemoteApi { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Convert to a JSON-RPC error code.
    pub fn jsonrpc_code(&self) -> i64 {
        match self.kind() {
            ErrorKind::UnknownTool | ErrorKind::NotFound => -32601,
            ErrorKind::Validation => -32602,
            _ => -32603,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn auth_failure(msg: impl Into<String>) -> Self {
        Self::AuthFailure(msg.into())
    }

    pub fn remote_api(code: i64, message: impl Into<String>) -> Self {
        Self::RemoteApi {
            code,
            message: message.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Transport(format!("request timed out: {}", err))
        } else {
            Error::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::auth_failure("x").kind(), ErrorKind::AuthFailure);
        assert_eq!(Error::remote_api(400, "x").kind(), ErrorKind::RemoteApiError);
        assert_eq!(Error::transport("x").kind(), ErrorKind::TransportFailure);
        assert_eq!(Error::unknown_tool("x").kind(), ErrorKind::UnknownTool);
        assert_eq!(Error::internal("x").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_remote_api_display_keeps_partner_message() {
        let err = Error::remote_api(400, "bad corp id");
        assert_eq!(err.to_string(), "partner API error 400: bad corp id");
        assert_eq!(err.remote_code(), Some(400));
    }

    #[test]
    fn test_jsonrpc_codes() {
        assert_eq!(Error::unknown_tool("x").jsonrpc_code(), -32601);
        assert_eq!(Error::validation("x").jsonrpc_code(), -32602);
        assert_eq!(Error::remote_api(1, "x").jsonrpc_code(), -32603);
    }

    #[test]
    fn test_kind_serializes_as_code() {
        let value = serde_json::to_value(ErrorKind::RemoteApiError).unwrap();
        assert_eq!(value, serde_json::json!("REMOTE_API_ERROR"));
        assert_eq!(ErrorKind::RemoteApiError.as_code(), "REMOTE_API_ERROR");
    }
}
