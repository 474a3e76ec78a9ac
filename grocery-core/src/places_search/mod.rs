//! Discover grocery stores near a location fix.
//!
//! The `PlacesSearch` trait abstracts the external nearby-places service.
//! Callers supply the accepted [`LocationFix`](crate::LocationFix) and
//! receive the raw, unfiltered [`PlaceCandidate`](crate::PlaceCandidate)
//! list the service returned.

mod error;
mod provider;

pub use error::PlacesSearchError;
pub use provider::PlacesSearch;
