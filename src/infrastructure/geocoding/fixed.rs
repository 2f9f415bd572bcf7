//! Offline geocoder for development and tests

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::geocoding::{GeocodedAddress, Geocoder};
use crate::domain::DomainError;

/// Answers from a fixed table, falling back to a default point
///
/// Without a fallback, unknown addresses do not geocode.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, GeocodedAddress>,
    fallback: Option<GeocodedAddress>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, address: &str, geocoded: GeocodedAddress) -> Self {
        self.entries.insert(address.trim().to_lowercase(), geocoded);
        self
    }

    pub fn with_fallback(mut self, geocoded: GeocodedAddress) -> Self {
        self.fallback = Some(geocoded);
        self
    }

    /// Development default: every address lands on one point in Boston
    pub fn development() -> Self {
        Self::new().with_fallback(GeocodedAddress {
            longitude: -71.0589,
            latitude: 42.3601,
            formatted_address: "Boston, MA 02108, US".to_string(),
            city: Some("Boston".to_string()),
            state_code: Some("MA".to_string()),
            zipcode: Some("02108".to_string()),
            country_code: Some("US".to_string()),
        })
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, DomainError> {
        if address.trim().is_empty() {
            return Ok(None);
        }

        Ok(self
            .entries
            .get(&address.trim().to_lowercase())
            .or(self.fallback.as_ref())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(city: &str) -> GeocodedAddress {
        GeocodedAddress {
            longitude: 1.0,
            latitude: 2.0,
            formatted_address: city.to_string(),
            city: Some(city.to_string()),
            state_code: None,
            zipcode: None,
            country_code: None,
        }
    }

    #[tokio::test]
    async fn test_entries_and_fallback() {
        let geocoder = StaticGeocoder::new().with_entry("Paris", point("Paris"));

        let found = geocoder.geocode(" paris ").await.unwrap().unwrap();
        assert_eq!(found.city.as_deref(), Some("Paris"));
        assert!(geocoder.geocode("Rome").await.unwrap().is_none());

        let geocoder = geocoder.with_fallback(point("Anywhere"));
        let found = geocoder.geocode("Rome").await.unwrap().unwrap();
        assert_eq!(found.city.as_deref(), Some("Anywhere"));
        assert!(geocoder.geocode("  ").await.unwrap().is_none());
    }
}
