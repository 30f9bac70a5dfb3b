// src/models/enrichment.rs

//! Enrichment lookup results and the fields they contribute to a record.

use serde::{Deserialize, Serialize};

/// Separator used when flattening subdivision codes into one field.
pub const SUBDIVISION_SEPARATOR: &str = ";";

/// Result of a successful geolocation lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// English city name
    pub city: String,

    /// Continent code (e.g., "EU")
    pub continent_code: String,

    /// ISO country code (e.g., "GB")
    pub country_code: String,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub metro_code: Option<u32>,

    /// IANA time zone (e.g., "Europe/London")
    pub time_zone: String,

    pub postal_code: String,

    /// Subdivision ISO codes, most general first
    pub subdivision_codes: Vec<String>,
}

/// Geolocation columns of an output record.
///
/// All text fields are empty and all numbers absent when the lookup missed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoFields {
    #[serde(rename = "geo_city")]
    pub city: String,

    #[serde(rename = "geo_continent_code")]
    pub continent_code: String,

    #[serde(rename = "geo_country_code")]
    pub country_code: String,

    #[serde(rename = "geo_latitude")]
    pub latitude: Option<f64>,

    #[serde(rename = "geo_longitude")]
    pub longitude: Option<f64>,

    #[serde(rename = "geo_metro_code")]
    pub metro_code: Option<u32>,

    #[serde(rename = "geo_time_zone")]
    pub time_zone: String,

    #[serde(rename = "geo_postal_code")]
    pub postal_code: String,

    /// Subdivision codes joined with [`SUBDIVISION_SEPARATOR`]
    #[serde(rename = "geo_subdivision_codes")]
    pub subdivision_codes: String,
}

impl From<GeoLocation> for GeoFields {
    fn from(location: GeoLocation) -> Self {
        Self {
            city: location.city,
            continent_code: location.continent_code,
            country_code: location.country_code,
            latitude: location.latitude,
            longitude: location.longitude,
            metro_code: location.metro_code,
            time_zone: location.time_zone,
            postal_code: location.postal_code,
            subdivision_codes: location.subdivision_codes.join(SUBDIVISION_SEPARATOR),
        }
    }
}

/// User-agent classification of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAgentInfo {
    #[serde(rename = "user_agent_family")]
    pub browser_family: String,
    #[serde(rename = "user_agent_major")]
    pub browser_major: String,
    #[serde(rename = "user_agent_minor")]
    pub browser_minor: String,
    #[serde(rename = "user_agent_patch")]
    pub browser_patch: String,

    #[serde(rename = "user_agent_os_family")]
    pub os_family: String,
    #[serde(rename = "user_agent_os_major")]
    pub os_major: String,
    #[serde(rename = "user_agent_os_minor")]
    pub os_minor: String,
    #[serde(rename = "user_agent_os_patch")]
    pub os_patch: String,
    #[serde(rename = "user_agent_os_patch_minor")]
    pub os_patch_minor: String,

    #[serde(rename = "user_agent_device_family")]
    pub device_family: String,
    #[serde(rename = "user_agent_device_brand")]
    pub device_brand: String,
    #[serde(rename = "user_agent_device_model")]
    pub device_model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_fields_join_subdivisions() {
        let location = GeoLocation {
            city: "London".to_string(),
            country_code: "GB".to_string(),
            subdivision_codes: vec!["ENG".to_string(), "LND".to_string()],
            ..GeoLocation::default()
        };
        let fields = GeoFields::from(location);
        assert_eq!(fields.city, "London");
        assert_eq!(fields.subdivision_codes, "ENG;LND");
    }

    #[test]
    fn test_empty_geo_fields_serialize_as_blank() {
        let json = serde_json::to_value(GeoFields::default()).unwrap();
        assert_eq!(json["geo_city"], "");
        assert!(json["geo_latitude"].is_null());
        assert_eq!(json["geo_subdivision_codes"], "");
    }
}
