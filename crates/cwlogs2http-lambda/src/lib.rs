// AWS Lambda runtime adapter
//
// Receives CloudWatch Logs subscription events and forwards the decoded
// records to the configured ingestion endpoint.
//
// lambda_runtime provides the tokio runtime; the pipeline is built once per
// cold start and shared across invocations.

use cwlogs2http_config::RuntimeConfig;
use cwlogs2http_core::SubscriptionEvent;
use cwlogs2http_forward::Pipeline;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::sync::Arc;
use tracing::info;

mod handlers;
mod init;
mod response;

use handlers::handle_request;
pub use response::InvocationSummary;

pub(crate) struct LambdaState {
    pub pipeline: Pipeline,
    pub fail_on_delivery_error: bool,
}

/// Lambda runtime entry point
pub async fn run() -> Result<(), Error> {
    let config = RuntimeConfig::load().map_err(|e| {
        // Tracing is configured from this same config, so report directly
        eprintln!("ERROR: failed to load configuration: {:#}", e);
        Error::from(format!("Failed to load configuration: {:#}", e))
    })?;

    init::init_tracing(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        build_timestamp = env!("BUILD_TIMESTAMP"),
        ingestion_url = %config.destination.ingestion_url,
        source_name = %config.source.name,
        source_field = %config.source.field,
        skip_patterns = ?config.transform.skip_patterns,
        include_metadata = config.transform.include_metadata,
        fail_on_delivery_error = config.destination.fail_on_delivery_error,
        "cwlogs2http Lambda starting"
    );

    let pipeline = Pipeline::from_config(&config)
        .map_err(|e| Error::from(format!("Failed to initialize pipeline: {:#}", e)))?;

    let state = Arc::new(LambdaState {
        pipeline,
        fail_on_delivery_error: config.destination.fail_on_delivery_error,
    });

    lambda_runtime::run(service_fn(move |event: LambdaEvent<SubscriptionEvent>| {
        let state = state.clone();
        async move { handle_request(event, state).await }
    }))
    .await
}
