//! MapQuest geocoding provider

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::geocoding::{GeocodedAddress, Geocoder};
use crate::domain::DomainError;

pub const DEFAULT_MAPQUEST_BASE_URL: &str = "https://www.mapquestapi.com";

#[derive(Debug, Clone)]
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl MapQuestGeocoder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_MAPQUEST_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn address_url(&self) -> String {
        format!("{}/geocoding/v1/address", self.base_url)
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, DomainError> {
        let response = self
            .client
            .get(self.address_url())
            .query(&[("key", self.api_key.as_str()), ("location", address)])
            .send()
            .await
            .map_err(|e| DomainError::provider("mapquest", format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "mapquest",
                format!("HTTP {}: {}", status, body),
            ));
        }

        let body: MapQuestResponse = response.json().await.map_err(|e| {
            DomainError::provider("mapquest", format!("Failed to parse response: {}", e))
        })?;

        let location = body
            .results
            .into_iter()
            .flat_map(|result| result.locations)
            .next();

        debug!(address, found = location.is_some(), "Geocoded address");
        Ok(location.map(MapQuestLocation::into_geocoded))
    }
}

// MapQuest API types

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: LatLng,
    #[serde(default)]
    street: String,
    /// City
    #[serde(default)]
    admin_area5: String,
    /// State
    #[serde(default)]
    admin_area3: String,
    /// Country
    #[serde(default)]
    admin_area1: String,
    #[serde(default)]
    postal_code: String,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl MapQuestLocation {
    fn formatted_address(&self) -> String {
        let state_zip = [self.admin_area3.as_str(), self.postal_code.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        [
            self.street.as_str(),
            self.admin_area5.as_str(),
            state_zip.as_str(),
            self.admin_area1.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
    }

    fn into_geocoded(self) -> GeocodedAddress {
        GeocodedAddress {
            longitude: self.lat_lng.lng,
            latitude: self.lat_lng.lat,
            formatted_address: self.formatted_address(),
            city: non_empty(self.admin_area5),
            state_code: non_empty(self.admin_area3),
            zipcode: non_empty(self.postal_code),
            country_code: non_empty(self.admin_area1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_geocode_first_location() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geocoding/v1/address"))
            .and(query_param("key", "test-key"))
            .and(query_param("location", "02101"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "locations": [{
                        "street": "",
                        "adminArea5": "Boston",
                        "adminArea3": "MA",
                        "adminArea1": "US",
                        "postalCode": "02101",
                        "latLng": {"lat": 42.3601, "lng": -71.0589}
                    }]
                }]
            })))
            .mount(&server)
            .await;

        let geocoder = MapQuestGeocoder::with_base_url("test-key", server.uri());
        let result = geocoder.geocode("02101").await.unwrap().unwrap();

        assert_eq!(result.longitude, -71.0589);
        assert_eq!(result.latitude, 42.3601);
        assert_eq!(result.formatted_address, "Boston, MA 02101, US");
        assert_eq!(result.city.as_deref(), Some("Boston"));
        assert_eq!(result.zipcode.as_deref(), Some("02101"));
    }

    #[tokio::test]
    async fn test_geocode_no_match() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"results": [{"locations": []}]})),
            )
            .mount(&server)
            .await;

        let geocoder = MapQuestGeocoder::with_base_url("test-key", server.uri());
        assert!(geocoder.geocode("nowhere").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_geocode_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;

        let geocoder = MapQuestGeocoder::with_base_url("wrong", server.uri());
        let result = geocoder.geocode("02101").await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }
}
