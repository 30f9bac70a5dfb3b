// src/pipeline/transform.rs

//! Batch transformer.
//!
//! Each record moves through parse, enrich, partition and serialize on its
//! own. A record that fails is reported as failed and never affects its
//! siblings. Output order and cardinality always match the input batch.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::error::{RecordError, Result};
use crate::models::{
    Config, FirehoseEvent, FirehoseRecord, FirehoseResponse, FirehoseResponseRecord, LogSchema,
    ResponseMetadata, TransformConfig, TransformResult,
};
use crate::pipeline::parse::{parse_line, strip_line_terminator};
use crate::pipeline::partition::PartitionKeySet;
use crate::services::Enrichers;

/// One raw record of a batch.
#[derive(Debug, Clone)]
pub struct InputRecord {
    pub record_id: String,
    pub data: Vec<u8>,
}

/// Result of transforming one record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// Serialized JSON plus its partition keys
    Ok {
        data: Vec<u8>,
        partition: PartitionKeySet,
        warnings: usize,
    },
    /// Nothing to deliver (blank line)
    Dropped,
    /// The record could not be transformed
    Failed(RecordError),
}

impl RecordOutcome {
    /// Firehose status for this outcome.
    pub fn result(&self) -> TransformResult {
        match self {
            RecordOutcome::Ok { .. } => TransformResult::Ok,
            RecordOutcome::Dropped => TransformResult::Dropped,
            RecordOutcome::Failed(_) => TransformResult::ProcessingFailed,
        }
    }
}

/// Outcome tagged with the id of the record it belongs to.
#[derive(Debug)]
pub struct OutputRecord {
    pub record_id: String,
    pub outcome: RecordOutcome,
}

/// Counts over one transformed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub ok: usize,
    pub dropped: usize,
    pub failed: usize,
    /// Field conversion warnings across all successful records
    pub warnings: usize,
}

impl BatchSummary {
    /// Tally a slice of outputs.
    pub fn from_outputs(outputs: &[OutputRecord]) -> Self {
        let mut summary = Self {
            total: outputs.len(),
            ..Self::default()
        };
        for output in outputs {
            match &output.outcome {
                RecordOutcome::Ok { warnings, .. } => {
                    summary.ok += 1;
                    summary.warnings += warnings;
                }
                RecordOutcome::Dropped => summary.dropped += 1,
                RecordOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Transforms raw log lines into enriched JSON.
///
/// Cloning is cheap; clones share the schema and enrichment datasets.
#[derive(Clone)]
pub struct BatchTransformer {
    schema: Arc<LogSchema>,
    enrichers: Enrichers,
    max_concurrent: usize,
    append_newline: bool,
}

impl BatchTransformer {
    /// Create a transformer from its parts.
    pub fn new(schema: LogSchema, enrichers: Enrichers, options: &TransformConfig) -> Self {
        Self {
            schema: Arc::new(schema),
            enrichers,
            max_concurrent: options.max_concurrent.max(1),
            append_newline: options.append_newline,
        }
    }

    /// Validate `config` and load the enrichment datasets it names.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let schema = config.active_schema()?.clone();
        let enrichers = Enrichers::from_config(&config.enrichment)?;

        log::info!(
            "Transformer ready: schema {} ({} fields), concurrency {}",
            schema.name,
            schema.width(),
            config.transform.max_concurrent
        );
        Ok(Self::new(schema, enrichers, &config.transform))
    }

    /// Active schema.
    pub fn schema(&self) -> &LogSchema {
        &self.schema
    }

    /// Transform a single line.
    ///
    /// Only an empty payload is dropped; whitespace-only lines still go
    /// through the parser and its width check.
    pub fn transform_line(&self, line: &str) -> RecordOutcome {
        if strip_line_terminator(line).is_empty() {
            return RecordOutcome::Dropped;
        }

        let parsed = match parse_line(line, &self.schema) {
            Ok(parsed) => parsed,
            Err(e) => return RecordOutcome::Failed(e),
        };

        let mut record = parsed.record;
        self.enrichers.enrich(&mut record);
        let partition = PartitionKeySet::derive(record.timestamp);

        match serde_json::to_vec(&record) {
            Ok(mut data) => {
                if self.append_newline {
                    data.push(b'\n');
                }
                RecordOutcome::Ok {
                    data,
                    partition,
                    warnings: parsed.warnings.len(),
                }
            }
            Err(e) => RecordOutcome::Failed(RecordError::Serialization(e)),
        }
    }

    /// Transform one raw payload.
    pub fn transform_bytes(&self, data: &[u8]) -> RecordOutcome {
        match std::str::from_utf8(data) {
            Ok(line) => self.transform_line(line),
            Err(e) => RecordOutcome::Failed(RecordError::InvalidEncoding(e.to_string())),
        }
    }

    /// Transform a batch, running up to `max_concurrent` records in parallel.
    ///
    /// Records are processed on the blocking pool; a panic while handling one
    /// record fails that record only. Failed records are logged.
    pub async fn transform_batch(&self, inputs: Vec<InputRecord>) -> Vec<OutputRecord> {
        let outputs: Vec<OutputRecord> = stream::iter(inputs)
            .map(|input| {
                let worker = self.clone();
                async move {
                    let InputRecord { record_id, data } = input;
                    let outcome =
                        match tokio::task::spawn_blocking(move || worker.transform_bytes(&data))
                            .await
                        {
                            Ok(outcome) => outcome,
                            Err(e) => RecordOutcome::Failed(RecordError::Worker(e.to_string())),
                        };
                    OutputRecord { record_id, outcome }
                }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        log_failures(&outputs);
        outputs
    }

    /// Transform a Firehose event into its response.
    pub async fn transform_event(&self, event: FirehoseEvent) -> (FirehoseResponse, BatchSummary) {
        let FirehoseEvent { records, .. } = event;

        // Undecodable records fail here; the rest go through the batch path.
        let mut decode_failures = Vec::new();
        let mut inputs = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match record.decode() {
                Ok(data) => inputs.push(InputRecord {
                    record_id: record.record_id.clone(),
                    data,
                }),
                Err(e) => {
                    log::error!("Record {} failed ({}): {}", record.record_id, e.kind(), e);
                    decode_failures.push((index, e));
                }
            }
        }

        let mut transformed = self.transform_batch(inputs).await.into_iter();
        let mut decode_failures = decode_failures.into_iter().peekable();
        let mut outputs = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let outcome = match decode_failures.next_if(|(i, _)| *i == index) {
                Some((_, e)) => RecordOutcome::Failed(e),
                None => match transformed.next() {
                    Some(output) => output.outcome,
                    None => RecordOutcome::Failed(RecordError::Worker(
                        "missing transform output".to_string(),
                    )),
                },
            };
            outputs.push(OutputRecord {
                record_id: record.record_id.clone(),
                outcome,
            });
        }

        let summary = BatchSummary::from_outputs(&outputs);
        let response = FirehoseResponse {
            records: records
                .into_iter()
                .zip(outputs)
                .map(|(input, output)| response_record(input, output.outcome))
                .collect(),
        };
        (response, summary)
    }
}

/// Log every failed record with its id and reason.
pub fn log_failures(outputs: &[OutputRecord]) {
    for output in outputs {
        if let RecordOutcome::Failed(e) = &output.outcome {
            log::error!(
                "Record {} failed ({}): {}",
                output.record_id,
                e.kind(),
                e
            );
        }
    }
}

fn response_record(input: FirehoseRecord, outcome: RecordOutcome) -> FirehoseResponseRecord {
    let result = outcome.result();
    match outcome {
        RecordOutcome::Ok {
            data, partition, ..
        } => FirehoseResponseRecord {
            record_id: input.record_id,
            result,
            data: FirehoseResponseRecord::encode(&data),
            metadata: Some(ResponseMetadata {
                partition_keys: partition.to_map(),
            }),
        },
        // Failed and dropped records hand the original payload back
        RecordOutcome::Dropped | RecordOutcome::Failed(_) => FirehoseResponseRecord {
            record_id: input.record_id,
            result,
            data: input.data,
            metadata: None,
        },
    }
}
