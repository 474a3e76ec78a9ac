//! Geofence-style proximity alerts around persisted stores.

use std::time::Duration;

use geo::Coord;
use thiserror::Error;

/// A proximity alert to register with the platform.
///
/// When the device enters or leaves `radius_meters` around `location` the
/// platform raises a notification naming `store_name`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProximityAlert {
    /// Distinguishes alerts registered in the same batch.
    pub request_code: u32,
    /// Store the alert refers to.
    pub store_name: String,
    /// Centre of the geofence.
    pub location: Coord<f64>,
    /// Geofence radius in meters.
    pub radius_meters: f32,
    /// Lifetime of the alert; `None` never expires.
    pub expiration: Option<Duration>,
}

/// Errors raised by a [`ProximityAlertRegistrar`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProximityAlertError {
    /// The platform refused to register the alert.
    #[error("failed to register proximity alert {request_code} for {store_name}: {message}")]
    Registration {
        /// Request code of the rejected alert.
        request_code: u32,
        /// Store the alert refers to.
        store_name: String,
        /// Platform-supplied reason.
        message: String,
    },
}

/// Platform facility raising notifications near a point.
///
/// Registering an alert with a request code that is already in use
/// replaces the previous alert for that code.
pub trait ProximityAlertRegistrar {
    /// Register `alert`.
    fn add_proximity_alert(&mut self, alert: &ProximityAlert) -> Result<(), ProximityAlertError>;
}
