// src/models/record.rs

//! Parsed and enriched real-time log record.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::models::{GeoFields, UserAgentInfo};

/// One CloudFront real-time log entry.
///
/// Columns absent from the active schema keep their default values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Request time in milliseconds since the Unix epoch
    pub timestamp: i64,

    /// Viewer IP; `None` when the column was not a valid address
    pub client_ip: Option<IpAddr>,

    pub status: u16,
    pub bytes: i64,
    pub method: String,
    pub protocol: String,
    pub host: String,
    pub uri_stem: String,
    pub edge_location: String,
    pub edge_request_id: String,
    pub host_header: String,

    /// Seconds between receiving the request and the last byte of response
    pub time_taken: f64,

    pub proto_version: String,
    pub ip_version: String,
    pub user_agent: String,
    pub referer: String,
    pub cookie: String,
    pub uri_query: String,
    pub edge_response_result_type: String,
    pub ssl_protocol: String,
    pub ssl_cipher: String,
    pub edge_result_type: String,
    pub content_type: String,

    /// `Content-Length` header value; `None` when CloudFront logged `-`
    pub content_length: Option<i64>,

    pub edge_detailed_result_type: String,
    pub country: String,
    pub cache_behavior_path_pattern: String,

    #[serde(flatten)]
    pub geo: GeoFields,

    #[serde(flatten)]
    pub agent: UserAgentInfo,
}
