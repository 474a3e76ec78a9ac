//! In-memory implementations of the platform traits used by unit and
//! behaviour tests.

use std::cell::Cell;
use std::time::Duration;

use crate::{
    Clock, GroceryStore, LocationFix, LocationProvider, LocationSource, LocationSourceError,
    PlaceCandidate, PlacesSearch, PlacesSearchError, PollTimeStore, ProximityAlert,
    ProximityAlertError, ProximityAlertRegistrar, Reminder, ReminderRepository, RepositoryError,
    StoreRepository,
};

/// Repository keeping stores, reminders and the poll time in vectors.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    stores: Vec<GroceryStore>,
    reminders: Vec<Reminder>,
    last_poll_time_ms: Option<u64>,
    next_store_id: i64,
    next_reminder_id: i64,
    fail_writes: bool,
}

impl MemoryRepository {
    /// Create a repository already holding `places`.
    pub fn with_stores<I>(places: I) -> Self
    where
        I: IntoIterator<Item = PlaceCandidate>,
    {
        let mut repository = Self::default();
        let places: Vec<_> = places.into_iter().collect();
        repository.push_stores(&places);
        repository
    }

    /// Make every subsequent store write fail.
    #[must_use]
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    fn push_stores(&mut self, places: &[PlaceCandidate]) -> Vec<GroceryStore> {
        places
            .iter()
            .map(|place| {
                self.next_store_id += 1;
                let store = GroceryStore::from_candidate(self.next_store_id, place.clone());
                self.stores.push(store.clone());
                store
            })
            .collect()
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if self.fail_writes {
            return Err(RepositoryError::Backend {
                message: "writes disabled".into(),
            });
        }
        Ok(())
    }
}

impl StoreRepository for MemoryRepository {
    fn insert_stores(
        &mut self,
        places: &[PlaceCandidate],
    ) -> Result<Vec<GroceryStore>, RepositoryError> {
        self.check_writable()?;
        Ok(self.push_stores(places))
    }

    fn delete_stores(&mut self, ids: &[i64]) -> Result<usize, RepositoryError> {
        self.check_writable()?;
        let before = self.stores.len();
        self.stores.retain(|store| !ids.contains(&store.id));
        Ok(before - self.stores.len())
    }

    fn stores(&self) -> Result<Vec<GroceryStore>, RepositoryError> {
        Ok(self.stores.clone())
    }
}

impl ReminderRepository for MemoryRepository {
    fn add_reminder(&mut self, description: &str) -> Result<Reminder, RepositoryError> {
        self.next_reminder_id += 1;
        let reminder = Reminder {
            id: self.next_reminder_id,
            description: description.to_owned(),
        };
        self.reminders.push(reminder.clone());
        Ok(reminder)
    }

    fn reminders(&self) -> Result<Vec<Reminder>, RepositoryError> {
        Ok(self.reminders.clone())
    }

    fn delete_reminder(&mut self, id: i64) -> Result<usize, RepositoryError> {
        let before = self.reminders.len();
        self.reminders.retain(|reminder| reminder.id != id);
        Ok(before - self.reminders.len())
    }

    fn delete_reminders_by_description(
        &mut self,
        description: &str,
    ) -> Result<usize, RepositoryError> {
        let before = self.reminders.len();
        self.reminders
            .retain(|reminder| reminder.description != description);
        Ok(before - self.reminders.len())
    }

    fn delete_all_reminders(&mut self) -> Result<usize, RepositoryError> {
        let removed = self.reminders.len();
        self.reminders.clear();
        Ok(removed)
    }
}

impl PollTimeStore for MemoryRepository {
    fn last_poll_time_ms(&self) -> Result<Option<u64>, RepositoryError> {
        Ok(self.last_poll_time_ms)
    }

    fn set_last_poll_time_ms(&mut self, timestamp_ms: u64) -> Result<(), RepositoryError> {
        self.last_poll_time_ms = Some(timestamp_ms);
        Ok(())
    }
}

/// `PlacesSearch` returning a canned response and counting calls.
#[derive(Debug, Clone)]
pub struct StubPlacesSearch {
    response: Result<Vec<PlaceCandidate>, PlacesSearchError>,
    calls: Cell<usize>,
}

impl StubPlacesSearch {
    /// Answer every search with `places`.
    #[must_use]
    pub fn with_places(places: Vec<PlaceCandidate>) -> Self {
        Self {
            response: Ok(places),
            calls: Cell::new(0),
        }
    }

    /// Fail every search with `error`.
    #[must_use]
    pub fn with_error(error: PlacesSearchError) -> Self {
        Self {
            response: Err(error),
            calls: Cell::new(0),
        }
    }

    /// Number of searches performed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl PlacesSearch for StubPlacesSearch {
    fn search_nearby(&self, _fix: &LocationFix) -> Result<Vec<PlaceCandidate>, PlacesSearchError> {
        self.calls.set(self.calls.get() + 1);
        self.response.clone()
    }
}

/// Clock whose time only moves when told to.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now_ms: Cell<u64>,
}

impl ManualClock {
    /// Start the clock at `now_ms`.
    #[must_use]
    pub const fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    /// Move the clock forward by `elapsed`.
    pub fn advance(&self, elapsed: Duration) {
        let step = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.now_ms.set(self.now_ms.get().saturating_add(step));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Registrar recording every alert it is given.
#[derive(Debug, Default, Clone)]
pub struct RecordingAlertRegistrar {
    alerts: Vec<ProximityAlert>,
    reject: bool,
}

impl RecordingAlertRegistrar {
    /// A registrar refusing every alert.
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            alerts: Vec::new(),
            reject: true,
        }
    }

    /// Alerts registered so far, oldest first.
    #[must_use]
    pub fn alerts(&self) -> &[ProximityAlert] {
        &self.alerts
    }
}

impl ProximityAlertRegistrar for RecordingAlertRegistrar {
    fn add_proximity_alert(&mut self, alert: &ProximityAlert) -> Result<(), ProximityAlertError> {
        if self.reject {
            return Err(ProximityAlertError::Registration {
                request_code: alert.request_code,
                store_name: alert.store_name.clone(),
                message: "permission denied".into(),
            });
        }
        self.alerts.push(alert.clone());
        Ok(())
    }
}

/// A registration recorded by [`RecordingLocationSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    /// Provider the updates were requested from.
    pub provider: LocationProvider,
    /// Minimum time between updates.
    pub min_time: Duration,
    /// Minimum distance between updates in meters.
    pub min_distance_meters: f64,
}

/// Location source with a fixed set of enabled providers.
#[derive(Debug, Default, Clone)]
pub struct RecordingLocationSource {
    enabled: Vec<LocationProvider>,
    refused: Vec<LocationProvider>,
    active: Vec<UpdateRequest>,
    removals: usize,
}

impl RecordingLocationSource {
    /// Enable the given providers.
    pub fn with_enabled<I>(providers: I) -> Self
    where
        I: IntoIterator<Item = LocationProvider>,
    {
        Self {
            enabled: providers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Refuse every registration for `provider`, as a platform without the
    /// needed permission would.
    #[must_use]
    pub fn refusing(mut self, provider: LocationProvider) -> Self {
        self.refused.push(provider);
        self
    }

    /// Registrations currently active.
    #[must_use]
    pub fn active(&self) -> &[UpdateRequest] {
        &self.active
    }

    /// How many times every registration was removed.
    #[must_use]
    pub const fn removals(&self) -> usize {
        self.removals
    }
}

impl LocationSource for RecordingLocationSource {
    fn is_provider_enabled(&self, provider: &LocationProvider) -> bool {
        self.enabled.contains(provider)
    }

    fn request_location_updates(
        &mut self,
        provider: &LocationProvider,
        min_time: Duration,
        min_distance_meters: f64,
    ) -> Result<(), LocationSourceError> {
        if self.refused.contains(provider) {
            return Err(LocationSourceError::Refused {
                provider: provider.to_string(),
                message: "permission denied".into(),
            });
        }
        self.active.push(UpdateRequest {
            provider: provider.clone(),
            min_time,
            min_distance_meters,
        });
        Ok(())
    }

    fn remove_updates(&mut self) {
        self.active.clear();
        self.removals += 1;
    }
}
