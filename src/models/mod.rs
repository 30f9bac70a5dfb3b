// src/models/mod.rs

//! Domain models for the log transformer.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod enrichment;
mod firehose;
mod record;
pub mod schema;

// Re-export all public types
pub use config::{Config, EnrichmentConfig, GeoIpConfig, TransformConfig, UserAgentConfig};
pub use enrichment::{GeoFields, GeoLocation, SUBDIVISION_SEPARATOR, UserAgentInfo};
pub use firehose::{
    FirehoseEvent, FirehoseRecord, FirehoseResponse, FirehoseResponseRecord, ResponseMetadata,
    TransformResult,
};
pub use record::LogRecord;
pub use schema::{FieldKind, LogSchema};
