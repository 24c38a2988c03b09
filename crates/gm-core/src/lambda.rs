//! Lambda runtime entry point.

use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::{error, info_span};

use crate::firehose::{FirehoseEvent, FirehoseResponse};
use crate::transform::Transformer;

/// Handle one delivery stream invocation.
///
/// A failed record fails the invocation, so the delivery stream retries the
/// whole batch.
pub async fn handler(
    transformer: &Transformer,
    event: LambdaEvent<FirehoseEvent>,
) -> Result<FirehoseResponse, Error> {
    handle(transformer, &event)
}

fn handle(
    transformer: &Transformer,
    event: &LambdaEvent<FirehoseEvent>,
) -> Result<FirehoseResponse, Error> {
    let span = info_span!("invocation", request_id = %event.context.request_id);
    span.in_scope(|| {
        transformer.transform(&event.payload).map_err(|err| {
            error!(record_id = %err.record_id(), error = %err, "rejecting batch");
            Error::from(err)
        })
    })
}

/// Serve invocations until the runtime shuts down.
pub async fn run(transformer: Transformer) -> Result<(), Error> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<FirehoseEvent>| async move {
        handler(&transformer, event).await
    }))
    .await
}
