//! Service layer for the transformer.
//!
//! This module contains the enrichment collaborators:
//! - Geolocation lookups (`GeoLocator`, `MaxMindLocator`)
//! - User-agent classification (`UserAgentClassifier`, `UapClassifier`)
//! - The shared bundle injected into the pipeline (`Enrichers`)

mod enrichment;
pub mod geoip;
pub mod useragent;

pub use enrichment::Enrichers;
pub use geoip::{GeoLocator, MaxMindLocator};
pub use useragent::{UapClassifier, UserAgentClassifier};

#[cfg(test)]
pub(crate) use enrichment::tests::fake_enrichers;
