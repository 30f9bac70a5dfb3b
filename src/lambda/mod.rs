// src/lambda/mod.rs

//! AWS Lambda handler for Firehose data transformation.
//!
//! The transformer is built once at cold start and borrowed by every
//! invocation. Record level failures are reported in the response;
//! the invocation itself only errors if the runtime cannot be served.

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use tracing::{info, instrument, warn};

use crate::models::{FirehoseEvent, FirehoseResponse};
use crate::pipeline::BatchTransformer;

/// Main Lambda handler function.
#[instrument(skip_all, fields(request_id = %event.context.request_id))]
pub async fn handler(
    transformer: &BatchTransformer,
    event: LambdaEvent<FirehoseEvent>,
) -> std::result::Result<FirehoseResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (event, _context) = event.into_parts();

    info!(
        "Transforming {} records from {}",
        event.records.len(),
        event.delivery_stream_arn
    );

    let (response, summary) = transformer.transform_event(event).await;

    info!(
        total = summary.total,
        ok = summary.ok,
        dropped = summary.dropped,
        failed = summary.failed,
        warnings = summary.warnings,
        execution_time_ms = start.elapsed().as_millis() as u64,
        "Batch transformed"
    );
    if summary.failed > 0 {
        warn!("{} of {} records failed", summary.failed, summary.total);
    }

    Ok(response)
}
