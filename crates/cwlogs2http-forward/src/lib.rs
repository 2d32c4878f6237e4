//! Delivery of transformed CloudWatch log records
//!
//! `client` owns the single outbound HTTP request; `pipeline` strings the
//! pure decode/transform step from `cwlogs2http-core` together with it.

pub mod client;
pub mod pipeline;

pub use client::{DeliveryReport, ForwardError, Forwarder};
pub use pipeline::{
    decode_limits, prepare, transform_options, Outcome, Pipeline, PipelineError, Prepared,
    SkipReason,
};
