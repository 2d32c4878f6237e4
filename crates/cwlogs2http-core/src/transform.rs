// Per-event classification and enrichment
//
// Each surviving log event becomes exactly one JSON object record:
// - message parses as a JSON object -> that object (structured, e.g. API Gateway access logs)
// - anything else                   -> {"message": <raw text>} (plain Lambda output)
// The configured source name is then written under the source field.

use crate::decode::{LogEvent, LogsEnvelope};
use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Enrichment key used when none is configured
pub const DEFAULT_SOURCE_FIELD: &str = "api_name";

/// Lambda START/END/REPORT platform lines all carry this marker
pub const DEFAULT_SKIP_PATTERN: &str = "RequestId:";

const MESSAGE_FIELD: &str = "message";
const LOG_GROUP_FIELD: &str = "log_group";
const LOG_STREAM_FIELD: &str = "log_stream";
const TIMESTAMP_FIELD: &str = "dt";

/// A single outbound log record (always a JSON object)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogRecord(Map<String, Value>);

impl LogRecord {
    /// Record for an unstructured message
    pub fn text(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(MESSAGE_FIELD.to_string(), Value::String(message.into()));
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set a field only if the record does not already carry it
    pub fn insert_if_absent(&mut self, key: &str, value: impl Into<Value>) {
        self.0
            .entry(key.to_string())
            .or_insert_with(|| value.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Structured,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    pub source_name: String,
    pub source_field: String,
    pub skip_patterns: Vec<String>,
    pub include_metadata: bool,
}

impl TransformOptions {
    /// Options with the default source field and skip patterns
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            source_field: DEFAULT_SOURCE_FIELD.to_string(),
            skip_patterns: vec![DEFAULT_SKIP_PATTERN.to_string()],
            include_metadata: false,
        }
    }
}

/// Records produced from one envelope plus counters for logging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformSummary {
    pub records: Vec<LogRecord>,
    pub skipped: usize,
    pub structured: usize,
    pub text: usize,
}

impl TransformSummary {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Best-effort JSON detection
///
/// Only JSON objects count as structured. Scalars and arrays are valid JSON
/// but cannot carry the enrichment field, so they are forwarded as text.
pub fn classify(message: &str) -> (RecordKind, LogRecord) {
    match serde_json::from_str::<Value>(message) {
        Ok(Value::Object(fields)) => (RecordKind::Structured, LogRecord(fields)),
        _ => (RecordKind::Text, LogRecord::text(message)),
    }
}

pub fn should_skip(message: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|pattern| !pattern.is_empty() && message.contains(pattern.as_str()))
}

/// Reshape a decoded envelope into enriched records
pub fn transform(envelope: &LogsEnvelope, options: &TransformOptions) -> TransformSummary {
    let mut summary = TransformSummary::default();

    if envelope.is_control_message() {
        tracing::debug!("Ignoring CloudWatch control message");
        return summary;
    }

    let Some(events) = envelope.log_events.as_ref() else {
        return summary;
    };

    summary.records.reserve(events.len());

    for event in events {
        let message = event.message.as_deref().unwrap_or("");
        if should_skip(message, &options.skip_patterns) {
            summary.skipped += 1;
            continue;
        }

        let (kind, mut record) = classify(message);
        match kind {
            RecordKind::Structured => summary.structured += 1,
            RecordKind::Text => summary.text += 1,
        }

        if options.include_metadata {
            attach_metadata(&mut record, envelope, event);
        }
        record.insert(options.source_field.as_str(), options.source_name.as_str());

        summary.records.push(record);
    }

    summary
}

fn attach_metadata(record: &mut LogRecord, envelope: &LogsEnvelope, event: &LogEvent) {
    if let Some(group) = envelope.log_group.as_deref() {
        record.insert_if_absent(LOG_GROUP_FIELD, group);
    }
    if let Some(stream) = envelope.log_stream.as_deref() {
        record.insert_if_absent(LOG_STREAM_FIELD, stream);
    }
    if let Some(dt) = event
        .timestamp
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    {
        record.insert_if_absent(TIMESTAMP_FIELD, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(message: Option<&str>) -> LogEvent {
        LogEvent {
            id: None,
            timestamp: Some(1705327800000),
            message: message.map(str::to_string),
        }
    }

    fn envelope(events: Vec<LogEvent>) -> LogsEnvelope {
        LogsEnvelope {
            message_type: Some("DATA_MESSAGE".to_string()),
            log_group: Some("/aws/lambda/api".to_string()),
            log_stream: Some("stream-1".to_string()),
            log_events: Some(events),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_structured() {
        let (kind, record) = classify(r#"{"status": 200, "path": "/users"}"#);
        assert_eq!(kind, RecordKind::Structured);
        assert_eq!(record.get("status"), Some(&json!(200)));
        assert!(record.get("message").is_none());
    }

    #[test]
    fn test_classify_tolerates_trailing_newline() {
        let (kind, _) = classify("{\"level\":\"info\"}\n");
        assert_eq!(kind, RecordKind::Structured);
    }

    #[test]
    fn test_classify_text() {
        let (kind, record) = classify("2024-01-15T14:30:00Z INFO user created");
        assert_eq!(kind, RecordKind::Text);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"message": "2024-01-15T14:30:00Z INFO user created"})
        );
    }

    #[test]
    fn test_classify_non_object_json_is_text() {
        for message in ["42", "\"quoted\"", "[1,2]", "null", "true"] {
            let (kind, record) = classify(message);
            assert_eq!(kind, RecordKind::Text, "{message}");
            assert_eq!(record.get("message"), Some(&json!(message)));
        }
    }

    #[test]
    fn test_should_skip() {
        let patterns = vec![DEFAULT_SKIP_PATTERN.to_string()];
        assert!(should_skip(
            "START RequestId: 8f5a Version: $LATEST",
            &patterns
        ));
        assert!(should_skip("END RequestId: 8f5a", &patterns));
        assert!(!should_skip("user created", &patterns));
        assert!(!should_skip("anything", &[]));
        assert!(!should_skip("anything", &[String::new()]));
    }

    #[test]
    fn test_transform_mixed_events() {
        let envelope = envelope(vec![
            event(Some("START RequestId: abc Version: $LATEST")),
            event(Some(r#"{"requestId":"r1","status":201}"#)),
            event(Some("plain text line")),
            event(None),
            event(Some("REPORT RequestId: abc Duration: 1.2 ms")),
        ]);

        let summary = transform(&envelope, &TransformOptions::new("Client-API-01"));
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.structured, 1);
        assert_eq!(summary.text, 2);

        let records: Vec<Value> = summary
            .records
            .iter()
            .map(|r| serde_json::to_value(r).unwrap())
            .collect();
        assert_eq!(
            records,
            vec![
                json!({"requestId": "r1", "status": 201, "api_name": "Client-API-01"}),
                json!({"message": "plain text line", "api_name": "Client-API-01"}),
                json!({"message": "", "api_name": "Client-API-01"}),
            ]
        );
    }

    #[test]
    fn test_source_field_overwrites_existing_value() {
        let envelope = envelope(vec![event(Some(r#"{"api_name":"spoofed"}"#))]);
        let summary = transform(&envelope, &TransformOptions::new("real"));
        assert_eq!(summary.records[0].get("api_name"), Some(&json!("real")));
    }

    #[test]
    fn test_custom_source_field() {
        let envelope = envelope(vec![event(Some("hi"))]);
        let options = TransformOptions {
            source_field: "service".to_string(),
            ..TransformOptions::new("billing")
        };
        let summary = transform(&envelope, &options);
        assert_eq!(summary.records[0].get("service"), Some(&json!("billing")));
        assert!(summary.records[0].get("api_name").is_none());
    }

    #[test]
    fn test_include_metadata() {
        let envelope = envelope(vec![
            event(Some("hi")),
            event(Some(r#"{"dt":"keep-me"}"#)),
        ]);
        let options = TransformOptions {
            include_metadata: true,
            ..TransformOptions::new("app")
        };
        let summary = transform(&envelope, &options);

        let first = &summary.records[0];
        assert_eq!(first.get("log_group"), Some(&json!("/aws/lambda/api")));
        assert_eq!(first.get("log_stream"), Some(&json!("stream-1")));
        assert_eq!(first.get("dt"), Some(&json!("2024-01-15T14:10:00.000Z")));

        assert_eq!(summary.records[1].get("dt"), Some(&json!("keep-me")));
    }

    #[test]
    fn test_control_message_yields_nothing() {
        let mut envelope = envelope(vec![event(Some("CWL CONTROL MESSAGE: Checking health"))]);
        envelope.message_type = Some("CONTROL_MESSAGE".to_string());
        let summary = transform(&envelope, &TransformOptions::new("app"));
        assert!(summary.is_empty());
    }

    #[test]
    fn test_missing_events_yields_nothing() {
        let envelope = LogsEnvelope::default();
        let summary = transform(&envelope, &TransformOptions::new("app"));
        assert!(summary.is_empty());
        assert_eq!(summary.skipped, 0);
    }
}
