//! Fields derived from client input on every job write

use super::entity::Location;
use crate::domain::geocoding::GeocodedAddress;

/// Lowercase, hyphen-separated form of a title
///
/// Letters and digits are kept, every other run of characters becomes a
/// single hyphen, and leading or trailing hyphens are dropped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Slug and GeoJSON location for a job, computed from its title and the
/// geocoded address
pub fn derive_job_fields(title: &str, geocoded: &GeocodedAddress) -> (String, Location) {
    let location = Location {
        kind: "Point".to_string(),
        coordinates: [geocoded.longitude, geocoded.latitude],
        formatted_address: geocoded.formatted_address.clone(),
        city: geocoded.city.clone(),
        state: geocoded.state_code.clone(),
        zipcode: geocoded.zipcode.clone(),
        country: geocoded.country_code.clone(),
    };

    (slugify(title), location)
}
