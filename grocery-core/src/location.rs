//! Location fixes reported by the platform and the source that emits them.

use std::fmt;
use std::time::Duration;

use geo::{Coord, Distance, Geodesic, Point};
use thiserror::Error;

/// Origin of a [`LocationFix`].
///
/// The three named providers mirror the ones a mobile platform exposes;
/// anything else is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LocationProvider {
    /// Satellite positioning.
    Gps,
    /// Cell tower and Wi-Fi positioning.
    Network,
    /// Fixes requested by other applications, delivered opportunistically.
    Passive,
    /// A provider this crate has no special handling for.
    Other(String),
}

impl LocationProvider {
    /// Provider name as used by the platform.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gps => "gps",
            Self::Network => "network",
            Self::Passive => "passive",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for LocationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LocationProvider {
    fn from(value: &str) -> Self {
        match value {
            "gps" => Self::Gps,
            "network" => Self::Network,
            "passive" => Self::Passive,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Errors returned by [`LocationFix::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationFixError {
    /// Latitude was outside `[-90, 90]` or not finite.
    #[error("latitude {0} is out of range")]
    InvalidLatitude(f64),
    /// Longitude was outside `[-180, 180]` or not finite.
    #[error("longitude {0} is out of range")]
    InvalidLongitude(f64),
    /// Accuracy was negative or not finite.
    #[error("accuracy {0} must be a non-negative number of meters")]
    InvalidAccuracy(f32),
}

/// A single location reading.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. The
/// timestamp is the wall-clock time of the fix in milliseconds since the
/// Unix epoch.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use grocery_core::{LocationFix, LocationProvider};
///
/// # fn main() -> Result<(), grocery_core::LocationFixError> {
/// let fix = LocationFix::new(
///     Coord { x: -0.1276, y: 51.5072 },
///     12.0,
///     1_700_000_000_000,
///     LocationProvider::Gps,
/// )?;
/// assert_eq!(fix.latitude(), 51.5072);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationFix {
    /// Position of the fix.
    pub location: Coord<f64>,
    /// Estimated horizontal accuracy radius in meters.
    pub accuracy: f32,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Provider that produced the fix.
    pub provider: LocationProvider,
}

impl LocationFix {
    /// Validate and construct a [`LocationFix`].
    pub fn new(
        location: Coord<f64>,
        accuracy: f32,
        timestamp_ms: u64,
        provider: LocationProvider,
    ) -> Result<Self, LocationFixError> {
        if !location.y.is_finite() || !(-90.0..=90.0).contains(&location.y) {
            return Err(LocationFixError::InvalidLatitude(location.y));
        }
        if !location.x.is_finite() || !(-180.0..=180.0).contains(&location.x) {
            return Err(LocationFixError::InvalidLongitude(location.x));
        }
        if !accuracy.is_finite() || accuracy < 0.0 {
            return Err(LocationFixError::InvalidAccuracy(accuracy));
        }
        Ok(Self {
            location,
            accuracy,
            timestamp_ms,
            provider,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }

    /// Geodesic distance in meters from this fix to `target`.
    #[must_use]
    pub fn distance_to(&self, target: Coord<f64>) -> f64 {
        distance_meters(self.location, target)
    }
}

/// Geodesic distance in meters between two WGS84 coordinates.
///
/// Uses the ellipsoidal model, matching what handset location services
/// report for `distanceBetween`-style queries.
#[must_use]
pub fn distance_meters(from: Coord<f64>, to: Coord<f64>) -> f64 {
    Geodesic.distance(Point::from(from), Point::from(to))
}

/// Errors raised by a [`LocationSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationSourceError {
    /// The platform refused the registration, usually for missing permission.
    #[error("location updates from {provider} were refused: {message}")]
    Refused {
        /// Provider the registration targeted.
        provider: String,
        /// Platform-supplied reason.
        message: String,
    },
}

/// Platform location service delivering fixes to the store manager.
///
/// Only one listener is ever installed; registrations made through this
/// trait all feed the same [`crate::StoreManager::handle_location_updated`]
/// callback.
pub trait LocationSource {
    /// Whether `provider` is currently enabled on the device.
    fn is_provider_enabled(&self, provider: &LocationProvider) -> bool;

    /// Start delivering updates from `provider` no more often than
    /// `min_time`, and only after moving `min_distance_meters`.
    fn request_location_updates(
        &mut self,
        provider: &LocationProvider,
        min_time: Duration,
        min_distance_meters: f64,
    ) -> Result<(), LocationSourceError>;

    /// Stop every registration made for the listener.
    fn remove_updates(&mut self);
}
