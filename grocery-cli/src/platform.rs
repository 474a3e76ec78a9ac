//! Platform stand-ins for running the store manager from a terminal.
//!
//! A shell session has no location service and no geofencing; fixes arrive
//! as arguments and alerts are reported in the command output instead.

use std::time::Duration;

use grocery_core::{
    LocationFix, LocationProvider, LocationSource, LocationSourceError, PlaceCandidate,
    PlacesSearch, PlacesSearchError, ProximityAlert, ProximityAlertError,
    ProximityAlertRegistrar,
};
use log::info;

/// Location source with every provider disabled.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NoLocationService;

impl LocationSource for NoLocationService {
    fn is_provider_enabled(&self, _provider: &LocationProvider) -> bool {
        false
    }

    fn request_location_updates(
        &mut self,
        provider: &LocationProvider,
        _min_time: Duration,
        _min_distance_meters: f64,
    ) -> Result<(), LocationSourceError> {
        Err(LocationSourceError::Refused {
            provider: provider.to_string(),
            message: "no location service in a terminal session".to_owned(),
        })
    }

    fn remove_updates(&mut self) {}
}

/// Places search for commands that only read persisted stores.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NoPlacesSearch;

impl PlacesSearch for NoPlacesSearch {
    fn search_nearby(&self, _fix: &LocationFix) -> Result<Vec<PlaceCandidate>, PlacesSearchError> {
        Ok(Vec::new())
    }
}

/// Registrar that keeps alerts so the command can print them.
#[derive(Debug, Default, Clone)]
pub(crate) struct CollectedAlerts {
    alerts: Vec<ProximityAlert>,
}

impl CollectedAlerts {
    pub(crate) fn alerts(&self) -> &[ProximityAlert] {
        &self.alerts
    }
}

impl ProximityAlertRegistrar for CollectedAlerts {
    fn add_proximity_alert(&mut self, alert: &ProximityAlert) -> Result<(), ProximityAlertError> {
        info!(
            "proximity alert {} for {} within {} meters",
            alert.request_code, alert.store_name, alert.radius_meters
        );
        self.alerts.push(alert.clone());
        Ok(())
    }
}
