// src/services/enrichment.rs

//! Shared, read-only enrichment context.
//!
//! Datasets are loaded once by [`Enrichers::from_config`] and then only read.
//! Handles are reference counted so every worker task sees the same data.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{EnrichmentConfig, GeoFields, LogRecord};
use crate::services::geoip::{DisabledLocator, GeoLocator, MaxMindLocator};
use crate::services::useragent::{DisabledClassifier, UapClassifier, UserAgentClassifier};
use crate::utils::percent_decode;

/// Geolocation and user-agent collaborators for the transformer.
#[derive(Clone)]
pub struct Enrichers {
    geo: Arc<dyn GeoLocator>,
    agent: Arc<dyn UserAgentClassifier>,
}

impl Enrichers {
    /// Create from explicit collaborators.
    pub fn new(geo: Arc<dyn GeoLocator>, agent: Arc<dyn UserAgentClassifier>) -> Self {
        Self { geo, agent }
    }

    /// Enrichers that add nothing.
    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledLocator), Arc::new(DisabledClassifier))
    }

    /// Load the configured datasets.
    ///
    /// Fails if an enabled dataset cannot be read.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self> {
        let geo: Arc<dyn GeoLocator> = if config.geoip.enabled {
            Arc::new(MaxMindLocator::open(&config.geoip.database_path)?)
        } else {
            log::info!("GeoIP enrichment disabled");
            Arc::new(DisabledLocator)
        };

        let agent: Arc<dyn UserAgentClassifier> = if config.user_agent.enabled {
            Arc::new(UapClassifier::from_path(&config.user_agent.regexes_path)?)
        } else {
            log::info!("User-agent enrichment disabled");
            Arc::new(DisabledClassifier)
        };

        Ok(Self::new(geo, agent))
    }

    /// Fill the enrichment columns of `record`.
    ///
    /// Misses and lookup errors leave the columns empty.
    pub fn enrich(&self, record: &mut LogRecord) {
        if let Some(ip) = record.client_ip {
            record.geo = match self.geo.lookup(ip) {
                Ok(Some(location)) => location.into(),
                Ok(None) => {
                    log::debug!("No GeoIP match for {}", ip);
                    GeoFields::default()
                }
                Err(e) => {
                    log::debug!("GeoIP lookup failed for {}: {}", ip, e);
                    GeoFields::default()
                }
            };
        }

        if !record.user_agent.is_empty() && record.user_agent != "-" {
            // CloudFront percent-encodes the header in real-time logs
            let decoded = percent_decode(&record.user_agent);
            record.agent = self.agent.classify(&decoded);
        }
    }
}
