//! Wire format for messages crossing the gateway queue.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Message envelope exchanged over the gateway queue.
///
/// `id` is present when the publisher expects a reply; events omit it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub pattern: String,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Envelope {
    /// Fire-and-forget event.
    pub fn event(pattern: impl Into<String>, data: Value) -> Self {
        Self {
            pattern: pattern.into(),
            data,
            id: None,
        }
    }

    /// Request expecting a correlated reply.
    pub fn request(pattern: impl Into<String>, data: Value) -> Self {
        Self {
            pattern: pattern.into(),
            data,
            id: Some(Uuid::new_v4().to_string()),
        }
    }
}

/// Reply sent back on the `reply_to` queue for a request envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplyEnvelope {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl ReplyEnvelope {
    pub fn success(id: impl Into<String>, response: Value) -> Self {
        Self {
            id: id.into(),
            response: Some(response),
            err: None,
        }
    }

    pub fn failure(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            response: None,
            err: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_omit_the_correlation_id_on_the_wire() {
        let envelope = Envelope::event("user.created", json!({"id": 7}));
        let wire = serde_json::to_string(&envelope).unwrap();
        assert!(!wire.contains("\"id\""));
    }

    #[test]
    fn requests_carry_a_correlation_id() {
        let envelope = Envelope::request("user.find", json!({"id": 7}));
        assert!(envelope.id.is_some());
    }

    #[test]
    fn tolerates_missing_optional_reply_fields() {
        let reply: ReplyEnvelope = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(reply.id, "abc");
        assert!(reply.response.is_none());
        assert!(reply.err.is_none());
    }
}
