// Payload decoding: base64 -> gzip -> envelope JSON
//
// Decompressed size is checked while inflating, not after, so a small
// payload cannot expand without bound in memory.

use base64::Engine;
use flate2::read::GzDecoder;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::io::Read;
use thiserror::Error;

/// Default cap on inflated payload size (64 MiB)
pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 64 * 1024 * 1024;

/// Message type CloudWatch uses for the reachability probe sent on subscription creation
pub const CONTROL_MESSAGE_TYPE: &str = "CONTROL_MESSAGE";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("gzip decompression failed: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("decompressed payload exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("invalid log envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

impl DecodeError {
    /// Short stable label used in logs and handler responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Base64(_) => "base64",
            Self::Gzip(_) => "gzip",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Envelope(_) => "envelope",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_decompressed_bytes: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
        }
    }
}

/// Decoded CloudWatch Logs envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_stream: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub subscription_filters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_events: Option<Vec<LogEvent>>,
}

impl LogsEnvelope {
    pub fn is_control_message(&self) -> bool {
        self.message_type.as_deref() == Some(CONTROL_MESSAGE_TYPE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Non-string messages are kept as their JSON text
    #[serde(
        default,
        deserialize_with = "message_as_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn message_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// Decode standard-alphabet base64, ignoring embedded ASCII whitespace
pub fn decode_base64(data: &str) -> Result<Vec<u8>, DecodeError> {
    let input: Cow<'_, [u8]> = if data.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(
            data.bytes()
                .filter(|b| !b.is_ascii_whitespace())
                .collect::<Vec<u8>>(),
        )
    } else {
        Cow::Borrowed(data.as_bytes())
    };

    Ok(base64::engine::general_purpose::STANDARD.decode(input.as_ref())?)
}

/// Inflate a gzip stream, refusing output larger than `limits.max_decompressed_bytes`
pub fn gunzip(compressed: &[u8], limits: &DecodeLimits) -> Result<Vec<u8>, DecodeError> {
    let limit = limits.max_decompressed_bytes;
    let mut decompressed = Vec::new();
    GzDecoder::new(compressed)
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut decompressed)
        .map_err(DecodeError::Gzip)?;

    if decompressed.len() > limit {
        return Err(DecodeError::PayloadTooLarge { limit });
    }

    Ok(decompressed)
}

/// Parse the envelope JSON; the document must be an object
pub fn parse_envelope(bytes: &[u8]) -> Result<LogsEnvelope, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if !value.is_object() {
        return Err(DecodeError::Envelope(serde::de::Error::custom(
            "envelope is not a JSON object",
        )));
    }
    Ok(serde_json::from_value(value)?)
}

/// Run the whole decode chain on an `awslogs.data` value
pub fn decode_payload(data: &str, limits: &DecodeLimits) -> Result<LogsEnvelope, DecodeError> {
    let compressed = decode_base64(data)?;
    let json = gunzip(&compressed, limits)?;
    let envelope = parse_envelope(&json)?;

    tracing::debug!(
        compressed_bytes = compressed.len(),
        decompressed_bytes = json.len(),
        log_group = envelope.log_group.as_deref().unwrap_or(""),
        events = envelope.log_events.as_ref().map_or(0, Vec::len),
        "Decoded log envelope"
    );

    Ok(envelope)
}
