//! Resolved place model for geocoding results

use serde::{Deserialize, Serialize};

/// A place returned by the geocoding lookup
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedPlace {
    /// Canonical place name as the provider spells it
    pub name: String,
    /// Country name, when the provider knows it
    pub country: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// First-level administrative area (state, region)
    pub admin1: Option<String>,
    /// IANA timezone of the place
    pub timezone: Option<String>,
}

impl ResolvedPlace {
    /// Create a new place without optional metadata
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            country: None,
            latitude,
            longitude,
            admin1: None,
            timezone: None,
        }
    }

    /// Create a place with country
    #[must_use]
    pub fn with_country(
        name: impl Into<String>,
        country: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            country: Some(country.into()),
            ..Self::new(name, latitude, longitude)
        }
    }

    /// "Name, Country", or just the name when the country is unknown
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.country {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }

    /// Format place as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
