use serde_json::Value;

use super::path::{lookup_array, lookup_f64, lookup_str};

/// One reported trial site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteLocation {
    pub city: String,
    pub state: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl SiteLocation {
    pub fn from_value(loc: &Value) -> Self {
        Self {
            city: lookup_str(loc, &["city"]).unwrap_or_default(),
            state: lookup_str(loc, &["state"]).unwrap_or_default(),
            country: lookup_str(loc, &["country"]).unwrap_or_default(),
            lat: lookup_f64(loc, &["geoPoint", "lat"]),
            lon: lookup_f64(loc, &["geoPoint", "lon"]),
        }
    }
}

/// Sites in the order the registry lists them.
pub fn extract(study: &Value) -> Vec<SiteLocation> {
    lookup_array(
        study,
        &["protocolSection", "contactsLocationsModule", "locations"],
    )
    .iter()
    .map(SiteLocation::from_value)
    .collect()
}
