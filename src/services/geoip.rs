// src/services/geoip.rs

//! Geolocation lookups backed by a MaxMind City database.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use maxminddb::{MaxMindDBError, Reader};
use serde::Deserialize;

use crate::error::Result;
use crate::models::GeoLocation;

/// Resolves client addresses to locations.
///
/// Implementations must be safe for concurrent read-only use.
pub trait GeoLocator: Send + Sync {
    /// Look up `ip`. `Ok(None)` means the address is not in the dataset.
    fn lookup(&self, ip: IpAddr) -> Result<Option<GeoLocation>>;
}

/// Locator reading a `.mmdb` file loaded fully into memory.
pub struct MaxMindLocator {
    reader: Reader<Vec<u8>>,
}

impl MaxMindLocator {
    /// Open the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let reader = Reader::open_readfile(path)?;
        log::info!(
            "Loaded GeoIP database {} ({} nodes)",
            reader.metadata.database_type,
            reader.metadata.node_count
        );
        Ok(Self { reader })
    }
}

impl GeoLocator for MaxMindLocator {
    fn lookup(&self, ip: IpAddr) -> Result<Option<GeoLocation>> {
        match self.reader.lookup::<CityRecord>(ip) {
            Ok(record) => Ok(Some(record.into())),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Locator used when geolocation is disabled.
pub struct DisabledLocator;

impl GeoLocator for DisabledLocator {
    fn lookup(&self, _ip: IpAddr) -> Result<Option<GeoLocation>> {
        Ok(None)
    }
}

/// Subset of the GeoIP2 City record layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CityRecord {
    city: Names,
    continent: Code,
    country: IsoCode,
    location: Location,
    postal: Code,
    subdivisions: Vec<IsoCode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Names {
    names: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Code {
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IsoCode {
    iso_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Location {
    latitude: Option<f64>,
    longitude: Option<f64>,
    metro_code: Option<u32>,
    time_zone: Option<String>,
}

impl From<CityRecord> for GeoLocation {
    fn from(record: CityRecord) -> Self {
        let CityRecord {
            mut city,
            continent,
            country,
            location,
            postal,
            subdivisions,
        } = record;

        GeoLocation {
            city: city.names.remove("en").unwrap_or_default(),
            continent_code: continent.code.unwrap_or_default(),
            country_code: country.iso_code.unwrap_or_default(),
            latitude: location.latitude,
            longitude: location.longitude,
            metro_code: location.metro_code,
            time_zone: location.time_zone.unwrap_or_default(),
            postal_code: postal.code.unwrap_or_default(),
            subdivision_codes: subdivisions
                .into_iter()
                .filter_map(|s| s.iso_code)
                .collect(),
        }
    }
}
