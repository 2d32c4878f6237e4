// Subscription event handler for Lambda
//
// Runs the forward pipeline and turns its outcome into an invocation result.

use cwlogs2http_core::SubscriptionEvent;
use lambda_runtime::{Error, LambdaEvent};
use std::sync::Arc;
use tracing::{error, Instrument};

use crate::{InvocationSummary, LambdaState};

pub(crate) async fn handle_request(
    event: LambdaEvent<SubscriptionEvent>,
    state: Arc<LambdaState>,
) -> Result<InvocationSummary, Error> {
    let (payload, context) = event.into_parts();
    let span = tracing::info_span!("invocation", request_id = %context.request_id);
    process_event(&payload, &state).instrument(span).await
}

/// Delivery failures are reported in the summary unless the deployment
/// asked for them to fail the invocation.
pub(crate) async fn process_event(
    event: &SubscriptionEvent,
    state: &LambdaState,
) -> Result<InvocationSummary, Error> {
    match state.pipeline.run(event).await {
        Ok(outcome) => Ok(InvocationSummary::from_outcome(&outcome)),
        Err(err) => {
            error!(error = %err, "Failed to deliver log batch");
            if state.fail_on_delivery_error {
                Err(err.into())
            } else {
                Ok(InvocationSummary::delivery_failed(&err))
            }
        }
    }
}
