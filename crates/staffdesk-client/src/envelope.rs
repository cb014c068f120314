//! Backend response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use staffdesk_model::PageMeta;

/// `{ success, message, data, error }` wrapper around every backend payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Backend success flag.
    #[serde(default)]
    pub success: bool,
    /// Human readable status message.
    #[serde(default)]
    pub message: String,
    /// Payload.
    pub data: T,
    /// Error detail (string or object) on failure.
    #[serde(default)]
    pub error: Option<Value>,
}

impl<T> Envelope<T> {
    /// Successful envelope around `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error: None,
        }
    }
}

impl Envelope<Value> {
    /// Failure envelope, `data` is null.
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Value::Null,
            error: Some(Value::String(error.into())),
        }
    }
}

/// Paginated list payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Pagination metadata.
    #[serde(default)]
    pub meta: PageMeta,
    /// Rows of the requested page.
    pub data: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_parses_with_optional_total() {
        let body = r#"{
            "success": true,
            "message": "OK",
            "data": {
                "meta": {"first":11,"last":20,"currentPage":2,"maxPages":3,"limit":10,"count":10,"total":25},
                "data": [{"id": 11}, {"id": 12}]
            },
            "error": null
        }"#;
        let envelope: Envelope<Paginated<Value>> = serde_json::from_str(body).expect("parse");
        assert!(envelope.success);
        assert_eq!(envelope.data.meta.current_page, 2);
        assert_eq!(envelope.data.meta.total_count(), 25);
        assert_eq!(envelope.data.data.len(), 2);
        assert!(envelope.error.is_none());
    }

    #[test]
    fn failure_envelope_shape() {
        let value = serde_json::to_value(Envelope::failure("Not found", "Not Found"))
            .expect("serialize");
        assert_eq!(value["success"], Value::Bool(false));
        assert_eq!(value["data"], Value::Null);
        assert_eq!(value["error"], Value::String("Not Found".into()));
    }
}
