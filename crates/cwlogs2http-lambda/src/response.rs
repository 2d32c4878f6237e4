// Invocation result returned to the Lambda runtime
//
// CloudWatch subscriptions invoke asynchronously, so nobody reads this body
// in production; it shows up in test invokes and the console.

use cwlogs2http_forward::{Outcome, PipelineError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationSummary {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub records_forwarded: usize,
    pub records_dropped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl InvocationSummary {
    pub fn from_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Skipped(reason) => Self {
                status: "skipped",
                reason: Some(reason.as_str().to_string()),
                records_forwarded: 0,
                records_dropped: 0,
                http_status: None,
            },
            Outcome::Empty { dropped } => Self {
                status: "empty",
                reason: None,
                records_forwarded: 0,
                records_dropped: *dropped,
                http_status: None,
            },
            Outcome::Delivered { report, dropped } => Self {
                status: "forwarded",
                reason: None,
                records_forwarded: report.records,
                records_dropped: *dropped,
                http_status: Some(report.status),
            },
        }
    }

    pub fn delivery_failed(err: &PipelineError) -> Self {
        let PipelineError::Delivery(forward_err) = err;
        Self {
            status: "delivery_failed",
            reason: Some(err.to_string()),
            records_forwarded: 0,
            records_dropped: 0,
            http_status: forward_err.status(),
        }
    }
}
