//! Geocoding collaborator

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;

#[cfg(test)]
use mockall::automock;

/// Best match for a free-form address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    pub longitude: f64,
    pub latitude: f64,
    pub formatted_address: String,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub zipcode: Option<String>,
    pub country_code: Option<String>,
}

/// Resolves addresses (or zipcodes) to coordinates
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Geocoder: Send + Sync + std::fmt::Debug {
    /// First match for the address, or `None` when nothing matched
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, DomainError>;
}
