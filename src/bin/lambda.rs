//! AWS Lambda entry point for the Firehose log transformer.
//!
//! Deploy with `cargo lambda build --release --features lambda`
//! and attach the function to the delivery stream as its processor.

use cf_rtl::config::load_lambda_config;
use cf_rtl::lambda::handler;
use cf_rtl::pipeline::BatchTransformer;
use lambda_runtime::{Error as LambdaError, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Firehose log transformer starting...");

    // Datasets load once per cold start and are shared across invocations.
    let config = load_lambda_config()?;
    let transformer = BatchTransformer::from_config(&config)?;
    let transformer = &transformer;

    lambda_runtime::run(service_fn(move |event| async move {
        handler(transformer, event).await
    }))
    .await
}
