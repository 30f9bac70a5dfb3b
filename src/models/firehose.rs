// src/models/firehose.rs

//! Kinesis Data Firehose data-transformation wire format.
//!
//! Firehose invokes the transform with a batch of base64 records and expects
//! exactly one response record per input record, carrying the same
//! `recordId`.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Transformation request sent by Firehose.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseEvent {
    #[serde(default)]
    pub invocation_id: String,

    #[serde(default)]
    pub delivery_stream_arn: String,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub records: Vec<FirehoseRecord>,
}

/// One input record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseRecord {
    pub record_id: String,

    /// Milliseconds since the epoch
    #[serde(default)]
    pub approximate_arrival_timestamp: Option<f64>,

    /// Base64-encoded raw log line
    pub data: String,
}

impl FirehoseRecord {
    /// Build a record from raw bytes.
    pub fn new(record_id: impl Into<String>, raw: &[u8]) -> Self {
        Self {
            record_id: record_id.into(),
            approximate_arrival_timestamp: None,
            data: BASE64.encode(raw),
        }
    }

    /// Decode the base64 payload.
    pub fn decode(&self) -> Result<Vec<u8>, RecordError> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| RecordError::InvalidEncoding(e.to_string()))
    }
}

/// Per-record transformation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformResult {
    Ok,
    Dropped,
    ProcessingFailed,
}

/// Transformation response returned to Firehose.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirehoseResponse {
    pub records: Vec<FirehoseResponseRecord>,
}

/// One output record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseResponseRecord {
    pub record_id: String,

    pub result: TransformResult,

    /// Base64 payload: transformed JSON on success, the input otherwise
    pub data: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl FirehoseResponseRecord {
    /// Decode the base64 payload.
    pub fn decode(&self) -> Result<Vec<u8>, RecordError> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| RecordError::InvalidEncoding(e.to_string()))
    }

    pub(crate) fn encode(data: &[u8]) -> String {
        BASE64.encode(data)
    }
}

/// Routing metadata for dynamic partitioning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub partition_keys: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_event() {
        let json = r#"{
            "invocationId": "inv-1",
            "deliveryStreamArn": "arn:aws:firehose:us-east-1:123456789012:deliverystream/rtl",
            "region": "us-east-1",
            "records": [
                {
                    "recordId": "49546986683135544286507457936321625675700192471156785154",
                    "approximateArrivalTimestamp": 1495072949453,
                    "data": "aGVsbG8="
                }
            ]
        }"#;
        let event: FirehoseEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.invocation_id, "inv-1");
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].decode().unwrap(), b"hello");
    }

    #[test]
    fn test_invalid_base64_is_record_error() {
        let record = FirehoseRecord {
            record_id: "1".to_string(),
            approximate_arrival_timestamp: None,
            data: "not base64!".to_string(),
        };
        assert!(matches!(
            record.decode(),
            Err(RecordError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_serialize_response_shape() {
        let response = FirehoseResponse {
            records: vec![
                FirehoseResponseRecord {
                    record_id: "a".to_string(),
                    result: TransformResult::Ok,
                    data: FirehoseResponseRecord::encode(b"{}"),
                    metadata: Some(ResponseMetadata {
                        partition_keys: BTreeMap::from([(
                            "year".to_string(),
                            "2022".to_string(),
                        )]),
                    }),
                },
                FirehoseResponseRecord {
                    record_id: "b".to_string(),
                    result: TransformResult::ProcessingFailed,
                    data: "eA==".to_string(),
                    metadata: None,
                },
            ],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["records"][0]["recordId"], "a");
        assert_eq!(json["records"][0]["result"], "Ok");
        assert_eq!(json["records"][0]["data"], "e30=");
        assert_eq!(json["records"][0]["metadata"]["partitionKeys"]["year"], "2022");
        assert_eq!(json["records"][1]["result"], "ProcessingFailed");
        assert!(json["records"][1].get("metadata").is_none());
    }
}
