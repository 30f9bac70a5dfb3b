//! Record publishers for replaying archived logs into an ingestion stream.
//!
//! - `StdoutPublisher`: prints each line (dry run)
//! - `KinesisPublisher`: `PutRecord` into a Kinesis data stream (feature `kinesis`)

#[cfg(feature = "kinesis")]
pub mod kinesis;

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};

#[cfg(feature = "kinesis")]
pub use kinesis::KinesisPublisher;

/// Where a published record landed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReceipt {
    pub shard_id: String,
    pub sequence_number: String,
}

/// Trait for ingestion stream backends.
#[async_trait]
pub trait RecordPublisher: Send + Sync {
    /// Publish one raw log line verbatim.
    async fn publish(&self, line: &str) -> Result<PublishReceipt>;
}

/// Dry-run publisher that writes every line to stdout.
#[derive(Debug, Default)]
pub struct StdoutPublisher {
    sequence: Mutex<u64>,
}

impl StdoutPublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordPublisher for StdoutPublisher {
    async fn publish(&self, line: &str) -> Result<PublishReceipt> {
        let sequence = {
            let mut guard = self
                .sequence
                .lock()
                .map_err(|_| AppError::stream("stdout publisher lock poisoned"))?;
            *guard += 1;
            *guard
        };

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{line}")?;

        Ok(PublishReceipt {
            shard_id: "stdout".to_string(),
            sequence_number: sequence.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Publisher that records every line it receives.
    #[derive(Default)]
    pub(crate) struct MemoryPublisher {
        pub lines: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RecordPublisher for MemoryPublisher {
        async fn publish(&self, line: &str) -> Result<PublishReceipt> {
            let mut lines = self.lines.lock().unwrap();
            lines.push(line.to_string());
            Ok(PublishReceipt {
                shard_id: "shardId-000000000000".to_string(),
                sequence_number: lines.len().to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_stdout_publisher_sequences() {
        let publisher = StdoutPublisher::new();
        let first = publisher.publish("one").await.unwrap();
        let second = publisher.publish("two").await.unwrap();
        assert_eq!(first.sequence_number, "1");
        assert_eq!(second.sequence_number, "2");
    }
}
