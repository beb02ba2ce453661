//! The uniform response wrapper used by the REST service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// `{success, message, data, timestamp}` wrapper around every response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,

    /// Human-readable outcome, or the failure reason
    #[serde(default)]
    pub message: String,

    /// Payload; `null` for failures and deletes
    pub data: Option<T>,

    #[serde(default = "Utc::now", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl<T> Envelope<T> {
    /// Successful response carrying `data`
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }

    /// Successful response without payload
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
        }
    }

    /// Failure response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let envelope: Envelope<u64> = Envelope::error("Book not found with id: 9");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Book not found with id: 9");
        assert!(json["data"].is_null());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_parse_envelope_without_timestamp() {
        let envelope: Envelope<u64> =
            serde_json::from_str(r#"{"success": true, "message": "Total books count", "data": 3}"#)
                .unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(3));
    }

    #[test]
    fn test_parse_envelope_with_null_data() {
        let envelope: Envelope<()> = serde_json::from_str(
            r#"{"success": true, "message": "Book deleted successfully", "data": null, "timestamp": "2023-12-07T10:00:00"}"#,
        )
        .unwrap();
        assert!(envelope.data.is_none());
    }
}
