// Inbound CloudWatch Logs subscription event
//
// Shape: {"awslogs": {"data": "<base64 of gzip of envelope JSON>"}}
// Every field is optional so unrelated invocation payloads still deserialize
// and are treated as a no-op rather than a runtime failure.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awslogs: Option<AwsLogs>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsLogs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl SubscriptionEvent {
    /// Wrap an already-encoded payload
    pub fn from_data(data: impl Into<String>) -> Self {
        Self {
            awslogs: Some(AwsLogs {
                data: Some(data.into()),
            }),
        }
    }

    /// The encoded payload, if the event carries one
    pub fn data(&self) -> Option<&str> {
        self.awslogs.as_ref()?.data.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_present() {
        let event: SubscriptionEvent =
            serde_json::from_str(r#"{"awslogs": {"data": "H4sI"}}"#).unwrap();
        assert_eq!(event.data(), Some("H4sI"));
    }

    #[test]
    fn test_unrelated_payload_has_no_data() {
        let event: SubscriptionEvent =
            serde_json::from_str(r#"{"Records": [{"eventSource": "aws:s3"}]}"#).unwrap();
        assert_eq!(event.data(), None);

        let event: SubscriptionEvent = serde_json::from_str(r#"{"awslogs": {}}"#).unwrap();
        assert_eq!(event.data(), None);
    }

    #[test]
    fn test_from_data_roundtrips_to_wire_shape() {
        let event = SubscriptionEvent::from_data("abc");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"awslogs": {"data": "abc"}})
        );
    }
}
