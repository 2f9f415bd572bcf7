//! Geocoding providers

mod fixed;
mod mapquest;

use std::sync::Arc;

pub use fixed::StaticGeocoder;
pub use mapquest::{MapQuestGeocoder, DEFAULT_MAPQUEST_BASE_URL};

use crate::domain::geocoding::Geocoder;
use crate::domain::DomainError;

/// Build the configured geocoder (`mapquest` or `static`)
pub fn create_geocoder(
    provider: &str,
    api_key: Option<&str>,
    base_url: Option<&str>,
) -> Result<Arc<dyn Geocoder>, DomainError> {
    match provider.to_lowercase().as_str() {
        "mapquest" => {
            let api_key = api_key.filter(|key| !key.is_empty()).ok_or_else(|| {
                DomainError::configuration("geocoder.api_key is required for mapquest")
            })?;
            let base_url = base_url
                .filter(|url| !url.is_empty())
                .unwrap_or(DEFAULT_MAPQUEST_BASE_URL);
            Ok(Arc::new(MapQuestGeocoder::with_base_url(api_key, base_url)))
        }
        "static" => Ok(Arc::new(StaticGeocoder::development())),
        other => Err(DomainError::configuration(format!(
            "Unknown geocoder provider '{}'",
            other
        ))),
    }
}
