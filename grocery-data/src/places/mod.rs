//! HTTP nearby-places search backed by the Google Places API.
//!
//! [`HttpPlacesSearch`] implements [`grocery_core::PlacesSearch`] by calling
//! the Nearby Search JSON endpoint. The trait is synchronous, so the
//! provider blocks on its own Tokio runtime for each request.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use geo::Coord;
//! use grocery_core::{LocationFix, LocationProvider, PlacesSearch};
//! use grocery_data::places::{HttpPlacesSearch, HttpPlacesSearchConfig};
//!
//! let config = HttpPlacesSearchConfig::new("my-api-key")
//!     .with_radius_meters(1500.0)
//!     .with_timeout(Duration::from_secs(10));
//! let search = HttpPlacesSearch::with_config(config)?;
//!
//! let fix = LocationFix::new(Coord { x: -0.1276, y: 51.5072 }, 12.0, 0, LocationProvider::Gps)?;
//! for place in search.search_nearby(&fix)? {
//!     println!("{} ({})", place.name, place.place_id);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod google;
mod provider;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_PLACE_TYPE, DEFAULT_USER_AGENT, HttpPlacesSearch,
    HttpPlacesSearchConfig, ProviderBuildError,
};
