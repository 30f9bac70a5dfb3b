//! AWS Kinesis Data Streams publisher.

use async_trait::async_trait;
use aws_sdk_kinesis::Client;
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;

use crate::error::{AppError, Result};
use crate::stream::{PublishReceipt, RecordPublisher};

/// Publishes raw lines with `PutRecord`.
pub struct KinesisPublisher {
    client: Client,
    stream_name: String,
    partition_key: String,
}

impl KinesisPublisher {
    /// Create a publisher from an existing client.
    pub fn new(
        client: Client,
        stream_name: impl Into<String>,
        partition_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            stream_name: stream_name.into(),
            partition_key: partition_key.into(),
        }
    }

    /// Create a publisher using the default AWS credential chain.
    pub async fn from_env(
        stream_name: impl Into<String>,
        partition_key: impl Into<String>,
        region: Option<String>,
    ) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Self::new(Client::new(&config), stream_name, partition_key)
    }
}

#[async_trait]
impl RecordPublisher for KinesisPublisher {
    async fn publish(&self, line: &str) -> Result<PublishReceipt> {
        let output = self
            .client
            .put_record()
            .stream_name(&self.stream_name)
            .partition_key(&self.partition_key)
            .data(Blob::new(line.as_bytes().to_vec()))
            .send()
            .await
            .map_err(|e| AppError::stream(DisplayErrorContext(&e)))?;

        Ok(PublishReceipt {
            shard_id: output.shard_id().to_string(),
            sequence_number: output.sequence_number().to_string(),
        })
    }
}
