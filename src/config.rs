// src/config.rs

//! Configuration loading utilities.
//!
//! Local runs read a TOML file and fall back to defaults. The Lambda reads
//! an optional file named by `CONFIG_PATH` and then applies environment
//! overrides on top.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::utils::fs::load_toml;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Load configuration from a TOML file.
///
/// Falls back to defaults if loading fails.
pub fn load_config(path: &Path) -> Result<Config> {
    load_toml(path).or_else(|e| {
        log::warn!("Failed to load config from {path:?}: {e}");
        log::warn!("Using default configuration.");
        Ok(Config::default())
    })
}

/// Load the Lambda configuration from the process environment.
///
/// A missing or broken `CONFIG_PATH` file is fatal.
pub fn load_lambda_config() -> Result<Config> {
    load_config_with(|key| std::env::var(key).ok())
}

/// Build a configuration from `lookup`, which resolves environment keys.
pub fn load_config_with<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(CONFIG_PATH_ENV) {
        Some(path) if !path.trim().is_empty() => {
            log::info!("Loading config from {path}");
            Config::load(&path).map_err(|e| {
                AppError::config(format!("Failed to load config from {path}: {e}"))
            })?
        }
        _ => Config::default(),
    };

    apply_env_overrides(&mut config, lookup);
    config.validate()?;
    Ok(config)
}

/// Apply environment overrides to `config`.
///
/// Unparseable values are logged and ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(schema) = lookup("LOG_SCHEMA") {
        config.transform.schema = schema;
    }
    if let Some(value) = parsed(&lookup, "MAX_CONCURRENT", |v| v.parse::<usize>().ok()) {
        config.transform.max_concurrent = value;
    }
    if let Some(value) = parsed(&lookup, "APPEND_NEWLINE", parse_bool) {
        config.transform.append_newline = value;
    }

    let enrichment = &mut config.enrichment;
    if let Some(path) = lookup("GEOIP_DATABASE_PATH") {
        enrichment.geoip.database_path = PathBuf::from(path);
    }
    if let Some(value) = parsed(&lookup, "GEOIP_ENABLED", parse_bool) {
        enrichment.geoip.enabled = value;
    }
    if let Some(path) = lookup("UA_REGEXES_PATH") {
        enrichment.user_agent.regexes_path = PathBuf::from(path);
    }
    if let Some(value) = parsed(&lookup, "UA_ENABLED", parse_bool) {
        enrichment.user_agent.enabled = value;
    }
}

fn parsed<F, T>(lookup: &F, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let value = parse(raw.trim());
    if value.is_none() {
        log::warn!("Ignoring invalid {key}={raw:?}");
    }
    value
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
