//! Nearby-places search trait.

use crate::{LocationFix, PlaceCandidate};

use super::error::PlacesSearchError;

/// Search for grocery stores around a fix.
///
/// Results are unfiltered: the store manager applies its own radius before
/// persisting anything.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use grocery_core::{LocationFix, LocationProvider, PlaceCandidate, PlacesSearch, PlacesSearchError};
///
/// struct CornerShop;
///
/// impl PlacesSearch for CornerShop {
///     fn search_nearby(&self, fix: &LocationFix) -> Result<Vec<PlaceCandidate>, PlacesSearchError> {
///         Ok(vec![PlaceCandidate::new("Corner Shop", "corner", fix.location)])
///     }
/// }
///
/// let fix = LocationFix::new(Coord { x: 0.0, y: 0.0 }, 5.0, 0, LocationProvider::Gps).unwrap();
/// let places = CornerShop.search_nearby(&fix)?;
/// assert_eq!(places.len(), 1);
/// # Ok::<(), PlacesSearchError>(())
/// ```
pub trait PlacesSearch {
    /// Return the places the service knows about near `fix`.
    fn search_nearby(&self, fix: &LocationFix) -> Result<Vec<PlaceCandidate>, PlacesSearchError>;
}

impl<T: PlacesSearch + ?Sized> PlacesSearch for Box<T> {
    fn search_nearby(&self, fix: &LocationFix) -> Result<Vec<PlaceCandidate>, PlacesSearchError> {
        (**self).search_nearby(fix)
    }
}
