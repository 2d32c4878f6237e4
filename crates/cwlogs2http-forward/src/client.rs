// HTTP delivery of a record batch
//
// One POST per invocation: the whole batch as a JSON array, authenticated
// with the source token as a bearer credential.

use cwlogs2http_config::DestinationConfig;
use cwlogs2http_core::LogRecord;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use thiserror::Error;
use tracing::{debug, warn};

/// Longest response body kept on a rejected delivery
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("ingestion endpoint rejected batch with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl ForwardError {
    /// HTTP status returned by the endpoint, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Client(_) => None,
        }
    }
}

/// Result of a successful delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub status: u16,
    pub records: usize,
}

#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Forwarder {
    /// Create a new Forwarder from the destination configuration
    pub fn new(config: &DestinationConfig) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self::with_client(
            client,
            config.ingestion_url.trim(),
            config.source_token.trim(),
        ))
    }

    /// Use a caller-supplied client (shared connection pool, custom TLS)
    pub fn with_client(
        client: reqwest::Client,
        url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            token: token.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `records` as a single JSON array
    pub async fn send(&self, records: &[LogRecord]) -> Result<DeliveryReport, ForwardError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(records)
            .send()
            .await
            .map_err(|source| ForwardError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = truncate_chars(&body, MAX_ERROR_BODY_CHARS);
            warn!(
                url = %self.url,
                status = %status,
                records = records.len(),
                "Ingestion endpoint returned non-success status"
            );
            return Err(ForwardError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            url = %self.url,
            status = %status,
            records = records.len(),
            "Delivered batch"
        );

        Ok(DeliveryReport {
            status: status.as_u16(),
            records: records.len(),
        })
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
    }

    #[test]
    fn test_debug_redacts_token() {
        let forwarder = Forwarder::with_client(
            reqwest::Client::new(),
            "https://in.logs.example.com",
            "super-secret",
        );
        let debug = format!("{:?}", forwarder);
        assert!(debug.contains("in.logs.example.com"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_new_trims_config_values() {
        let config = DestinationConfig {
            ingestion_url: " https://in.logs.example.com ".to_string(),
            source_token: "tok\n".to_string(),
            ..Default::default()
        };
        let forwarder = Forwarder::new(&config).unwrap();
        assert_eq!(forwarder.url(), "https://in.logs.example.com");
        assert_eq!(forwarder.token, "tok");
    }

    #[test]
    fn test_rejected_status() {
        let err = ForwardError::Rejected {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("401"));
    }
}
