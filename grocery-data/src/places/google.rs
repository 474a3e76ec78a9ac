//! Response types for the Google Places Nearby Search JSON endpoint.
//!
//! Only the fields the engine consumes are modelled; everything else in
//! the payload is ignored.
//!
//! See: <https://developers.google.com/maps/documentation/places/web-service/search-nearby>

use geo::Coord;
use grocery_core::PlaceCandidate;
use serde::Deserialize;

/// Status reported for a successful search with matches.
pub const STATUS_OK: &str = "OK";
/// Status reported for a successful search without matches.
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Top-level Nearby Search response.
#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    /// Service status, e.g. `"OK"`, `"ZERO_RESULTS"` or `"REQUEST_DENIED"`.
    pub status: String,

    /// Detail accompanying a failure status.
    pub error_message: Option<String>,

    /// Matching places; absent on some failure statuses.
    #[serde(default)]
    pub results: Vec<NearbyPlace>,
}

impl NearbySearchResponse {
    /// Whether the status denotes success, with or without matches.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK || self.status == STATUS_ZERO_RESULTS
    }
}

/// A single search result.
#[derive(Debug, Deserialize)]
pub struct NearbyPlace {
    /// Display name.
    pub name: String,
    /// Stable place identifier.
    pub place_id: String,
    /// Position wrapper.
    pub geometry: Geometry,
}

/// Geometry block of a result.
#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// Position of the place.
    pub location: LatLng,
}

/// A WGS84 position as the service encodes it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl From<NearbyPlace> for PlaceCandidate {
    fn from(place: NearbyPlace) -> Self {
        let LatLng { lat, lng } = place.geometry.location;
        Self::new(place.name, place.place_id, Coord { x: lng, y: lat })
    }
}
