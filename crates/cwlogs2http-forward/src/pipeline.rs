// End-to-end invocation: decode -> transform -> deliver
//
// Stateless: one subscription event in, zero or one outbound request out.
// Payloads that cannot be decoded are logged and skipped, never sent.

use crate::client::{DeliveryReport, ForwardError, Forwarder};
use anyhow::Context;
use cwlogs2http_config::RuntimeConfig;
use cwlogs2http_core::{
    process_event, DecodeError, DecodeLimits, SubscriptionEvent, TransformOptions,
    TransformSummary,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why an invocation produced no request
#[derive(Debug)]
pub enum SkipReason {
    /// The event had no `awslogs.data`
    MissingData,
    Decode(DecodeError),
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingData => "missing_data",
            Self::Decode(err) => err.kind(),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Skipped(SkipReason),
    /// Decoded fine, but every event was filtered out
    Empty { dropped: usize },
    Delivered {
        report: DeliveryReport,
        dropped: usize,
    },
}

impl Outcome {
    pub fn records_forwarded(&self) -> usize {
        match self {
            Self::Delivered { report, .. } => report.records,
            _ => 0,
        }
    }

    pub fn dropped(&self) -> usize {
        match self {
            Self::Empty { dropped } | Self::Delivered { dropped, .. } => *dropped,
            Self::Skipped(_) => 0,
        }
    }
}

/// Result of the offline half of the pipeline
#[derive(Debug)]
pub enum Prepared {
    /// Nothing to send; the outcome is final
    Done(Outcome),
    Ready(TransformSummary),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("delivery failed: {0}")]
    Delivery(#[from] ForwardError),
}

pub struct Pipeline {
    forwarder: Forwarder,
    limits: DecodeLimits,
    options: TransformOptions,
}

impl Pipeline {
    pub fn new(forwarder: Forwarder, limits: DecodeLimits, options: TransformOptions) -> Self {
        Self {
            forwarder,
            limits,
            options,
        }
    }

    /// Build the forwarder and transform settings from a validated config
    pub fn from_config(config: &RuntimeConfig) -> anyhow::Result<Self> {
        let forwarder =
            Forwarder::new(&config.destination).context("Failed to create forwarder")?;
        Ok(Self::new(
            forwarder,
            decode_limits(config),
            transform_options(config),
        ))
    }

    /// Decode and transform without any I/O
    pub fn prepare(&self, event: &SubscriptionEvent) -> Prepared {
        prepare(event, &self.limits, &self.options)
    }

    /// Run one invocation; sends at most one request
    pub async fn run(&self, event: &SubscriptionEvent) -> Result<Outcome, PipelineError> {
        let summary = match self.prepare(event) {
            Prepared::Done(outcome) => return Ok(outcome),
            Prepared::Ready(summary) => summary,
        };

        let report = self.forwarder.send(&summary.records).await?;
        info!(
            records = report.records,
            structured = summary.structured,
            text = summary.text,
            dropped = summary.skipped,
            status = report.status,
            "Forwarded log batch"
        );

        Ok(Outcome::Delivered {
            report,
            dropped: summary.skipped,
        })
    }
}

/// Offline half of the pipeline, shared by the Lambda handler and the CLI
pub fn prepare(
    event: &SubscriptionEvent,
    limits: &DecodeLimits,
    options: &TransformOptions,
) -> Prepared {
    match process_event(event, limits, options) {
        Ok(None) => {
            debug!("Event carries no awslogs.data; nothing to forward");
            Prepared::Done(Outcome::Skipped(SkipReason::MissingData))
        }
        Err(err) => {
            warn!(reason = err.kind(), error = %err, "Dropping undecodable payload");
            Prepared::Done(Outcome::Skipped(SkipReason::Decode(err)))
        }
        Ok(Some(summary)) if summary.is_empty() => {
            debug!(dropped = summary.skipped, "No records left after filtering");
            Prepared::Done(Outcome::Empty {
                dropped: summary.skipped,
            })
        }
        Ok(Some(summary)) => Prepared::Ready(summary),
    }
}

pub fn decode_limits(config: &RuntimeConfig) -> DecodeLimits {
    DecodeLimits {
        max_decompressed_bytes: config.request.max_decompressed_bytes,
    }
}

pub fn transform_options(config: &RuntimeConfig) -> TransformOptions {
    TransformOptions {
        source_name: config.source.name.clone(),
        source_field: config.source.field.clone(),
        skip_patterns: config.transform.skip_patterns.clone(),
        include_metadata: config.transform.include_metadata,
    }
}
