// cwlogs2http-core - Platform-agnostic core logic
//
// This crate contains the PURE processing logic for turning a CloudWatch Logs
// subscription payload into enriched log records. No I/O, no async, no
// runtime dependencies.
//
// Flow: base64 -> gzip -> envelope JSON -> per-event classify + enrich

pub mod decode;
pub mod event;
pub mod transform;

pub use decode::{decode_payload, DecodeError, DecodeLimits, LogEvent, LogsEnvelope};
pub use event::{AwsLogs, SubscriptionEvent};
pub use transform::{
    classify, should_skip, transform, LogRecord, RecordKind, TransformOptions, TransformSummary,
    DEFAULT_SKIP_PATTERN, DEFAULT_SOURCE_FIELD,
};

/// Decode and transform a subscription event in one step.
///
/// Returns `Ok(None)` when the event carries no `awslogs.data` payload at all,
/// which callers treat as a no-op invocation.
pub fn process_event(
    event: &SubscriptionEvent,
    limits: &DecodeLimits,
    options: &TransformOptions,
) -> Result<Option<TransformSummary>, DecodeError> {
    let Some(data) = event.data() else {
        return Ok(None);
    };

    let envelope = decode_payload(data, limits)?;
    Ok(Some(transform(&envelope, options)))
}
