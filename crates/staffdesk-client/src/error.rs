//! Remote error taxonomy.

use serde_json::Value;
use smol_str::SmolStr;
use thiserror::Error;

/// Fallback when the backend gives no usable message.
pub const GENERIC_MESSAGE: &str = "An error occurred";

/// Coarse class of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// 404 from the backend.
    NotFound,
    /// 401/403, or no session to authenticate with.
    Auth,
    /// Network failure, any other non-2xx status, or a malformed body.
    Transport,
}

/// Normalized failure of a backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    /// Failure class.
    pub kind: RemoteErrorKind,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Backend supplied message, or [`GENERIC_MESSAGE`].
    pub message: SmolStr,
}

impl RemoteError {
    /// Classifies a non-2xx response and extracts its message.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            404 => RemoteErrorKind::NotFound,
            401 | 403 => RemoteErrorKind::Auth,
            _ => RemoteErrorKind::Transport,
        };
        Self {
            kind,
            status: Some(status),
            message: extract_message(body),
        }
    }

    /// Failure before any response was received.
    pub fn transport(message: impl Into<SmolStr>) -> Self {
        Self {
            kind: RemoteErrorKind::Transport,
            status: None,
            message: message.into(),
        }
    }

    /// Missing or rejected credentials detected locally.
    pub fn auth(message: impl Into<SmolStr>) -> Self {
        Self {
            kind: RemoteErrorKind::Auth,
            status: None,
            message: message.into(),
        }
    }

    /// A 2xx response whose body could not be interpreted.
    pub fn malformed(status: u16, detail: impl std::fmt::Display) -> Self {
        Self {
            kind: RemoteErrorKind::Transport,
            status: Some(status),
            message: format!("malformed response: {detail}").into(),
        }
    }

    /// The record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }

    /// The call was not authenticated.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        self.kind == RemoteErrorKind::Auth
    }
}

/// Picks `message`, then a string `error`, from the backend's error envelope.
#[must_use]
pub fn extract_message(body: &str) -> SmolStr {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return SmolStr::new(GENERIC_MESSAGE);
    };
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map_or_else(|| SmolStr::new(GENERIC_MESSAGE), SmolStr::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            RemoteError::from_status(404, "").kind,
            RemoteErrorKind::NotFound
        );
        assert_eq!(RemoteError::from_status(401, "").kind, RemoteErrorKind::Auth);
        assert_eq!(RemoteError::from_status(403, "").kind, RemoteErrorKind::Auth);
        assert_eq!(
            RemoteError::from_status(400, "").kind,
            RemoteErrorKind::Transport
        );
        assert_eq!(
            RemoteError::from_status(503, "").kind,
            RemoteErrorKind::Transport
        );
    }

    #[test]
    fn message_prefers_backend_envelope() {
        let err = RemoteError::from_status(
            400,
            r#"{"success":false,"message":"Email already exists","data":null,"error":"Bad Request"}"#,
        );
        assert_eq!(err.message, "Email already exists");
        assert_eq!(err.status, Some(400));
        assert_eq!(err.to_string(), "Email already exists");
    }

    #[test]
    fn message_falls_back_to_error_string_then_generic() {
        assert_eq!(
            extract_message(r#"{"message":"","error":"Unauthorized"}"#),
            "Unauthorized"
        );
        assert_eq!(
            extract_message(r#"{"message":null,"error":{"code":1}}"#),
            GENERIC_MESSAGE
        );
        assert_eq!(extract_message("<html>bad gateway</html>"), GENERIC_MESSAGE);
    }
}
