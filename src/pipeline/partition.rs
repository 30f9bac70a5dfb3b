// src/pipeline/partition.rs

//! Time-based partition keys for Firehose dynamic partitioning.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Calendar date of a record in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKeySet {
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
    /// Day of month, 1-31
    pub day: u32,
}

impl PartitionKeySet {
    /// Derive the UTC calendar date of a millisecond epoch timestamp.
    ///
    /// Timestamps outside the representable range map to the epoch.
    pub fn derive(timestamp_millis: i64) -> Self {
        let time = DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
            .unwrap_or(DateTime::UNIX_EPOCH);

        Self {
            year: time.year(),
            month: time.month(),
            day: time.day(),
        }
    }

    /// Render as the `partitionKeys` map expected by Firehose.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("year".to_string(), self.year.to_string()),
            ("month".to_string(), self.month.to_string()),
            ("day".to_string(), self.day.to_string()),
        ])
    }
}
