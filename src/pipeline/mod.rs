// src/pipeline/mod.rs

//! Pipeline entry points for log processing.
//!
//! - `BatchTransformer`: parse, enrich and re-encode Firehose batches
//! - `run_replay`: republish archived raw lines into an ingestion stream

pub mod parse;
pub mod partition;
pub mod replay;
pub mod transform;

pub use parse::{FieldWarning, ParsedLine, parse_line};
pub use partition::PartitionKeySet;
pub use replay::{ReplayOptions, ReplaySummary, run_replay};
pub use transform::{
    BatchSummary, BatchTransformer, InputRecord, OutputRecord, RecordOutcome, log_failures,
};
