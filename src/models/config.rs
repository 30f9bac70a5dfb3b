// src/models/config.rs

//! Application configuration structures.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::LogSchema;
use crate::utils::fs::load_toml;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Batch transform behavior
    #[serde(default)]
    pub transform: TransformConfig,

    /// Enrichment datasets
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Known column layouts
    #[serde(default = "defaults::schemas")]
    pub schemas: Vec<LogSchema>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_toml(path.as_ref())
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.transform.max_concurrent == 0 {
            return Err(AppError::validation("transform.max_concurrent must be > 0"));
        }
        if self.schemas.is_empty() {
            return Err(AppError::validation("No schemas defined"));
        }

        let mut names = HashSet::new();
        for schema in &self.schemas {
            schema.validate()?;
            if !names.insert(schema.name.as_str()) {
                return Err(AppError::validation(format!(
                    "schema '{}' is defined more than once",
                    schema.name
                )));
            }
        }
        self.active_schema()?;

        let geoip = &self.enrichment.geoip;
        if geoip.enabled && geoip.database_path.as_os_str().is_empty() {
            return Err(AppError::validation(
                "enrichment.geoip.database_path is empty",
            ));
        }
        let user_agent = &self.enrichment.user_agent;
        if user_agent.enabled && user_agent.regexes_path.as_os_str().is_empty() {
            return Err(AppError::validation(
                "enrichment.user_agent.regexes_path is empty",
            ));
        }
        Ok(())
    }

    /// The schema selected by `transform.schema`.
    pub fn active_schema(&self) -> Result<&LogSchema> {
        self.schemas
            .iter()
            .find(|s| s.name == self.transform.schema)
            .ok_or_else(|| {
                AppError::config(format!(
                    "transform.schema '{}' is not defined",
                    self.transform.schema
                ))
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transform: TransformConfig::default(),
            enrichment: EnrichmentConfig::default(),
            schemas: defaults::schemas(),
        }
    }
}

/// Batch transform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Name of the schema raw lines are parsed with
    #[serde(default = "defaults::schema")]
    pub schema: String,

    /// Maximum records transformed in parallel within one batch
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Terminate each JSON payload with a newline
    #[serde(default = "defaults::append_newline")]
    pub append_newline: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            schema: defaults::schema(),
            max_concurrent: defaults::max_concurrent(),
            append_newline: defaults::append_newline(),
        }
    }
}

/// Enrichment dataset settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default)]
    pub geoip: GeoIpConfig,

    #[serde(default)]
    pub user_agent: UserAgentConfig,
}

/// MaxMind City database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Path to a `GeoLite2-City.mmdb` compatible database
    #[serde(default = "defaults::geoip_database")]
    pub database_path: PathBuf,
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            database_path: defaults::geoip_database(),
        }
    }
}

/// ua-parser rule set settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Path to the ua-parser `regexes.yaml`
    #[serde(default = "defaults::regexes")]
    pub regexes_path: PathBuf,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            regexes_path: defaults::regexes(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use crate::models::LogSchema;
    use crate::models::schema::DEFAULT_SCHEMA;

    // Transform defaults
    pub fn schema() -> String {
        DEFAULT_SCHEMA.into()
    }
    pub fn max_concurrent() -> usize {
        8
    }
    pub fn append_newline() -> bool {
        true
    }
    pub fn schemas() -> Vec<LogSchema> {
        vec![LogSchema::cloudfront_rtl_v1()]
    }

    // Enrichment defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn geoip_database() -> PathBuf {
        PathBuf::from("data/GeoLite2-City.mmdb")
    }
    pub fn regexes() -> PathBuf {
        PathBuf::from("data/regexes.yaml")
    }
}
