// src/models/schema.rs

//! Column layout of real-time log lines.
//!
//! CloudFront real-time logs are configured per distribution, so the set and
//! order of columns is deployment specific. A [`LogSchema`] names an ordered
//! list of [`FieldKind`]s; the parser maps column `i` of a line onto
//! `fields[i]`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Name of the built-in schema.
pub const DEFAULT_SCHEMA: &str = "cloudfront-rtl-v1";

/// A known real-time log column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Timestamp,
    ClientIp,
    Status,
    Bytes,
    Method,
    Protocol,
    Host,
    UriStem,
    EdgeLocation,
    EdgeRequestId,
    HostHeader,
    TimeTaken,
    ProtoVersion,
    IpVersion,
    UserAgent,
    Referer,
    Cookie,
    UriQuery,
    EdgeResponseResultType,
    SslProtocol,
    SslCipher,
    EdgeResultType,
    ContentType,
    ContentLength,
    EdgeDetailedResultType,
    Country,
    CacheBehaviorPathPattern,
}

impl FieldKind {
    /// Field name as emitted in the JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Timestamp => "timestamp",
            FieldKind::ClientIp => "client_ip",
            FieldKind::Status => "status",
            FieldKind::Bytes => "bytes",
            FieldKind::Method => "method",
            FieldKind::Protocol => "protocol",
            FieldKind::Host => "host",
            FieldKind::UriStem => "uri_stem",
            FieldKind::EdgeLocation => "edge_location",
            FieldKind::EdgeRequestId => "edge_request_id",
            FieldKind::HostHeader => "host_header",
            FieldKind::TimeTaken => "time_taken",
            FieldKind::ProtoVersion => "proto_version",
            FieldKind::IpVersion => "ip_version",
            FieldKind::UserAgent => "user_agent",
            FieldKind::Referer => "referer",
            FieldKind::Cookie => "cookie",
            FieldKind::UriQuery => "uri_query",
            FieldKind::EdgeResponseResultType => "edge_response_result_type",
            FieldKind::SslProtocol => "ssl_protocol",
            FieldKind::SslCipher => "ssl_cipher",
            FieldKind::EdgeResultType => "edge_result_type",
            FieldKind::ContentType => "content_type",
            FieldKind::ContentLength => "content_length",
            FieldKind::EdgeDetailedResultType => "edge_detailed_result_type",
            FieldKind::Country => "country",
            FieldKind::CacheBehaviorPathPattern => "cache_behavior_path_pattern",
        }
    }

    /// Column name used in the CloudFront real-time log configuration.
    pub fn column_name(&self) -> &'static str {
        match self {
            FieldKind::Timestamp => "timestamp",
            FieldKind::ClientIp => "c-ip",
            FieldKind::Status => "sc-status",
            FieldKind::Bytes => "sc-bytes",
            FieldKind::Method => "cs-method",
            FieldKind::Protocol => "cs-protocol",
            FieldKind::Host => "cs-host",
            FieldKind::UriStem => "cs-uri-stem",
            FieldKind::EdgeLocation => "x-edge-location",
            FieldKind::EdgeRequestId => "x-edge-request-id",
            FieldKind::HostHeader => "x-host-header",
            FieldKind::TimeTaken => "time-taken",
            FieldKind::ProtoVersion => "cs-protocol-version",
            FieldKind::IpVersion => "c-ip-version",
            FieldKind::UserAgent => "cs-user-agent",
            FieldKind::Referer => "cs-referer",
            FieldKind::Cookie => "cs-cookie",
            FieldKind::UriQuery => "cs-uri-query",
            FieldKind::EdgeResponseResultType => "x-edge-response-result-type",
            FieldKind::SslProtocol => "ssl-protocol",
            FieldKind::SslCipher => "ssl-cipher",
            FieldKind::EdgeResultType => "x-edge-result-type",
            FieldKind::ContentType => "sc-content-type",
            FieldKind::ContentLength => "sc-content-len",
            FieldKind::EdgeDetailedResultType => "x-edge-detailed-result-type",
            FieldKind::Country => "c-country",
            FieldKind::CacheBehaviorPathPattern => "cache-behavior-path-pattern",
        }
    }
}

/// Named, ordered column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSchema {
    /// Schema identifier (e.g., "cloudfront-rtl-v1")
    pub name: String,

    /// Columns in the order they appear in a raw line
    pub fields: Vec<FieldKind>,
}

impl LogSchema {
    /// The 27-column layout used by the standard real-time log configuration.
    pub fn cloudfront_rtl_v1() -> Self {
        use FieldKind::*;

        Self {
            name: DEFAULT_SCHEMA.to_string(),
            fields: vec![
                Timestamp,
                ClientIp,
                Status,
                Bytes,
                Method,
                Protocol,
                Host,
                UriStem,
                EdgeLocation,
                EdgeRequestId,
                HostHeader,
                TimeTaken,
                ProtoVersion,
                IpVersion,
                UserAgent,
                Referer,
                Cookie,
                UriQuery,
                EdgeResponseResultType,
                SslProtocol,
                SslCipher,
                EdgeResultType,
                ContentType,
                ContentLength,
                EdgeDetailedResultType,
                Country,
                CacheBehaviorPathPattern,
            ],
        }
    }

    /// Number of tab-separated fields a line must have.
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// CloudFront column names in line order, as entered in the real-time
    /// log configuration.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(FieldKind::column_name).collect()
    }

    /// Check that the schema is usable.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("schema name is empty"));
        }
        if self.fields.is_empty() {
            return Err(AppError::validation(format!(
                "schema '{}' has no fields",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field) {
                return Err(AppError::validation(format!(
                    "schema '{}' lists '{}' more than once",
                    self.name,
                    field.as_str()
                )));
            }
        }
        Ok(())
    }
}

impl Default for LogSchema {
    fn default() -> Self {
        Self::cloudfront_rtl_v1()
    }
}
