// src/error.rs

//! Unified error handling for the log transformer.
//!
//! Two layers of failure exist:
//! - [`AppError`]: process-level failures (configuration, datasets, I/O).
//!   These abort startup or a CLI command.
//! - [`RecordError`]: a single log record could not be transformed. These are
//!   reported back to Firehose as `ProcessingFailed` and never abort a batch.

use std::fmt;

use thiserror::Error;

/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Base64 payload could not be decoded
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// GeoIP database could not be opened or read
    #[error("GeoIP database error: {0}")]
    GeoIp(#[from] maxminddb::MaxMindDBError),

    /// User-agent rule set could not be loaded
    #[error("User-agent rules error for {path}: {message}")]
    UserAgent { path: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A raw line does not match the configured schema width
    #[error("Schema mismatch at {context}: expected {expected} fields, found {found}")]
    Schema {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Publishing a record to the ingestion stream failed
    #[error("Stream error: {0}")]
    Stream(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a user-agent rules loading error.
    pub fn user_agent(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::UserAgent {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a stream publishing error.
    pub fn stream(message: impl fmt::Display) -> Self {
        Self::Stream(message.to_string())
    }
}

/// Failure of a single record inside a batch.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Wrong number of tab-separated fields
    #[error("schema mismatch: expected {expected} fields, found {found}")]
    SchemaMismatch { expected: usize, found: usize },

    /// Payload is not valid base64 or not valid UTF-8
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Enriched record could not be serialized
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Worker task for the record did not complete
    #[error("worker failed: {0}")]
    Worker(String),
}

impl RecordError {
    /// Short machine-friendly tag for log fields and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordError::SchemaMismatch { .. } => "schema_mismatch",
            RecordError::InvalidEncoding(_) => "invalid_encoding",
            RecordError::Serialization(_) => "serialization",
            RecordError::Worker(_) => "worker",
        }
    }
}
