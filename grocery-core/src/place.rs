//! Places returned by a nearby search and the records persisted from them.

use std::fmt;

use geo::Coord;

use crate::{LocationFix, distance_meters};

/// A store returned by the external nearby-places search.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use grocery_core::PlaceCandidate;
///
/// let place = PlaceCandidate::new("Corner Grocer", "ChIJ-corner", Coord { x: 1.0, y: 2.0 });
/// assert_eq!(place.name, "Corner Grocer");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceCandidate {
    /// Display name.
    pub name: String,
    /// Identifier assigned by the places service.
    pub place_id: String,
    /// WGS84 position, `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
}

impl PlaceCandidate {
    /// Construct a [`PlaceCandidate`].
    pub fn new(name: impl Into<String>, place_id: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            name: name.into(),
            place_id: place_id.into(),
            location,
        }
    }
}

/// A store row persisted from a previous search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroceryStore {
    /// Row identifier assigned by the repository.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Identifier assigned by the places service.
    pub place_id: String,
    /// WGS84 position, `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
}

impl GroceryStore {
    /// Attach a repository identifier to a searched place.
    #[must_use]
    pub fn from_candidate(id: i64, candidate: PlaceCandidate) -> Self {
        Self {
            id,
            name: candidate.name,
            place_id: candidate.place_id,
            location: candidate.location,
        }
    }
}

/// A persisted store paired with its distance from the current fix.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStore {
    /// The persisted store.
    pub store: GroceryStore,
    /// Geodesic distance in meters, when a current fix is known.
    pub distance_meters: Option<f64>,
}

/// A free-text grocery reminder.
///
/// Displays as its description.
///
/// ```
/// use grocery_core::Reminder;
///
/// let reminder = Reminder { id: 1, description: "oat milk".into() };
/// assert_eq!(reminder.to_string(), "oat milk");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reminder {
    /// Row identifier assigned by the repository.
    pub id: i64,
    /// What to buy.
    pub description: String,
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Keep the places within `radius_meters` of `fix`, preserving order.
///
/// Places exactly on the radius are kept.
///
/// ```
/// use geo::Coord;
/// use grocery_core::{LocationFix, LocationProvider, PlaceCandidate, filter_places_by_distance};
///
/// let fix = LocationFix::new(Coord { x: 0.0, y: 0.0 }, 5.0, 0, LocationProvider::Gps).unwrap();
/// let near = PlaceCandidate::new("Near", "n", Coord { x: 0.0, y: 0.001 });
/// let far = PlaceCandidate::new("Far", "f", Coord { x: 0.0, y: 1.0 });
/// let kept = filter_places_by_distance(&fix, &[near.clone(), far], 1000.0);
/// assert_eq!(kept, vec![near]);
/// ```
#[must_use]
pub fn filter_places_by_distance(
    fix: &LocationFix,
    places: &[PlaceCandidate],
    radius_meters: f64,
) -> Vec<PlaceCandidate> {
    places
        .iter()
        .filter(|place| distance_meters(fix.location, place.location) <= radius_meters)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocationProvider;
    use rstest::{fixture, rstest};

    #[fixture]
    fn origin() -> LocationFix {
        LocationFix::new(Coord { x: -0.1276, y: 51.5072 }, 10.0, 0, LocationProvider::Gps)
            .expect("valid fix")
    }

    fn place_north_of(fix: &LocationFix, degrees: f64) -> PlaceCandidate {
        PlaceCandidate::new(
            "Grocer",
            "grocer",
            Coord {
                x: fix.longitude(),
                y: fix.latitude() + degrees,
            },
        )
    }

    #[rstest]
    fn keeps_place_exactly_on_the_radius(origin: LocationFix) {
        let place = place_north_of(&origin, 0.005);
        let radius = origin.distance_to(place.location);
        let kept = filter_places_by_distance(&origin, std::slice::from_ref(&place), radius);
        assert_eq!(kept, vec![place]);
    }

    #[rstest]
    fn drops_place_just_beyond_the_radius(origin: LocationFix) {
        let place = place_north_of(&origin, 0.005);
        let radius = origin.distance_to(place.location) - 1e-6;
        assert!(filter_places_by_distance(&origin, &[place], radius).is_empty());
    }

    #[rstest]
    fn preserves_input_order(origin: LocationFix) {
        let places = vec![
            place_north_of(&origin, 0.004),
            place_north_of(&origin, 0.001),
            place_north_of(&origin, 0.002),
        ];
        let kept = filter_places_by_distance(&origin, &places, 1000.0);
        assert_eq!(kept, places);
    }

    #[test]
    fn store_keeps_candidate_fields() {
        let candidate = PlaceCandidate::new("Grocer", "abc", Coord { x: 3.0, y: 4.0 });
        let store = GroceryStore::from_candidate(7, candidate);
        assert_eq!(store.id, 7);
        assert_eq!(store.place_id, "abc");
        assert_eq!(store.location, Coord { x: 3.0, y: 4.0 });
    }
}
