//! Location-driven store discovery.
//!
//! [`StoreManager`] receives location fixes, keeps the best one as the
//! current location, prunes persisted stores that fell out of range, polls
//! the places service at most once per interval, and registers a proximity
//! alert for every store it keeps.
//!
//! # Update flow
//!
//! 1. [`StoreManager::handle_location_updated`] runs the acceptance
//!    heuristic. Rejected fixes change nothing.
//! 2. Stores farther than the search radius from the new fix are deleted.
//! 3. If the poll interval has elapsed the poll time is recorded and the
//!    places service is queried.
//! 4. Results within the radius are persisted, alerted and handed to the
//!    observer registered with [`StoreManager::set_on_stores_updated`].

use std::fmt;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    Clock, GroceryStore, LocationAcceptance, LocationFix, LocationProvider, LocationSource,
    LocationSourceError, NearbyStore, PlaceCandidate, PlacesSearch, PlacesSearchError,
    PollTimeStore, ProximityAlert, ProximityAlertError, ProximityAlertRegistrar, RepositoryError,
    StoreManagerConfig, StoreManagerConfigError, StoreRepository, SystemClock, distance_meters,
    filter_places_by_distance, poll_is_due,
};


/// Callback invoked after freshly searched stores have been persisted.
pub type StoresUpdatedObserver = Box<dyn FnMut(&LocationFix, &[GroceryStore])>;

/// Errors returned by [`StoreManager`] operations.
#[derive(Debug, Error)]
pub enum StoreManagerError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] StoreManagerConfigError),
    /// Reading or writing persisted state failed.
    #[error("store persistence failed: {0}")]
    Repository(#[from] RepositoryError),
    /// A proximity alert could not be registered.
    #[error(transparent)]
    ProximityAlert(#[from] ProximityAlertError),
    /// The location service refused a registration.
    #[error(transparent)]
    LocationSource(#[from] LocationSourceError),
}

/// What happened to a nearby-places poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The previous poll was too recent.
    Throttled,
    /// The search ran and its in-range results were persisted.
    Completed {
        /// Rows inserted for this poll.
        stores: Vec<GroceryStore>,
    },
    /// The search failed; the poll time was still recorded.
    SearchFailed(PlacesSearchError),
}

/// Result of [`StoreManager::handle_location_updated`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The fix did not supersede the current location.
    Rejected,
    /// The fix became the current location.
    Accepted {
        /// Persisted stores deleted for being out of range.
        removed: usize,
        /// Outcome of the follow-up poll.
        poll: PollOutcome,
    },
}

/// Coordinates location updates, store polling and proximity alerts.
///
/// The manager is generic over its platform boundaries: a location source,
/// a places search, a repository that also persists the poll time, an alert
/// registrar and a clock.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use grocery_core::test_support::{
///     ManualClock, MemoryRepository, RecordingAlertRegistrar, RecordingLocationSource,
///     StubPlacesSearch,
/// };
/// use grocery_core::{LocationFix, LocationProvider, PlaceCandidate, StoreManager, UpdateOutcome};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fix = LocationFix::new(Coord { x: 0.0, y: 0.0 }, 10.0, 0, LocationProvider::Gps)?;
/// let grocer = PlaceCandidate::new("Grocer", "g", Coord { x: 0.0, y: 0.001 });
/// let mut manager = StoreManager::new(
///     RecordingLocationSource::default(),
///     StubPlacesSearch::with_places(vec![grocer]),
///     MemoryRepository::default(),
///     RecordingAlertRegistrar::default(),
/// )
/// .with_clock(ManualClock::starting_at(1_700_000_000_000));
///
/// let outcome = manager.handle_location_updated(fix)?;
/// assert!(matches!(outcome, UpdateOutcome::Accepted { .. }));
/// assert_eq!(manager.alert_registrar().alerts().len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct StoreManager<L, P, R, A, C = SystemClock>
where
    L: LocationSource,
    P: PlacesSearch,
    R: StoreRepository + PollTimeStore,
    A: ProximityAlertRegistrar,
    C: Clock,
{
    location_source: L,
    places_search: P,
    repository: R,
    alert_registrar: A,
    clock: C,
    config: StoreManagerConfig,
    current_location: Option<LocationFix>,
    last_update_time_ms: Option<u64>,
    listening: bool,
    on_stores_updated: Option<StoresUpdatedObserver>,
}

impl<L, P, R, A, C> fmt::Debug for StoreManager<L, P, R, A, C>
where
    L: LocationSource,
    P: PlacesSearch,
    R: StoreRepository + PollTimeStore,
    A: ProximityAlertRegistrar,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreManager")
            .field("config", &self.config)
            .field("current_location", &self.current_location)
            .field("last_update_time_ms", &self.last_update_time_ms)
            .field("listening", &self.listening)
            .finish_non_exhaustive()
    }
}

impl<L, P, R, A> StoreManager<L, P, R, A>
where
    L: LocationSource,
    P: PlacesSearch,
    R: StoreRepository + PollTimeStore,
    A: ProximityAlertRegistrar,
{
    /// Construct a manager using the system clock and default thresholds.
    pub fn new(location_source: L, places_search: P, repository: R, alert_registrar: A) -> Self {
        Self {
            location_source,
            places_search,
            repository,
            alert_registrar,
            clock: SystemClock,
            config: StoreManagerConfig::default(),
            current_location: None,
            last_update_time_ms: None,
            listening: false,
            on_stores_updated: None,
        }
    }
}

impl<L, P, R, A, C> StoreManager<L, P, R, A, C>
where
    L: LocationSource,
    P: PlacesSearch,
    R: StoreRepository + PollTimeStore,
    A: ProximityAlertRegistrar,
    C: Clock,
{
    /// Replace the thresholds after validating them.
    pub fn with_config(mut self, config: StoreManagerConfig) -> Result<Self, StoreManagerError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replace the clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> StoreManager<L, P, R, A, C2> {
        StoreManager {
            location_source: self.location_source,
            places_search: self.places_search,
            repository: self.repository,
            alert_registrar: self.alert_registrar,
            clock,
            config: self.config,
            current_location: self.current_location,
            last_update_time_ms: self.last_update_time_ms,
            listening: self.listening,
            on_stores_updated: self.on_stores_updated,
        }
    }

    /// Register the callback run after searched stores are persisted.
    pub fn set_on_stores_updated<F>(&mut self, observer: F)
    where
        F: FnMut(&LocationFix, &[GroceryStore]) + 'static,
    {
        self.on_stores_updated = Some(Box::new(observer));
    }

    /// The active thresholds.
    #[must_use]
    pub const fn config(&self) -> &StoreManagerConfig {
        &self.config
    }

    /// The currently accepted fix, if any.
    #[must_use]
    pub const fn current_location(&self) -> Option<&LocationFix> {
        self.current_location.as_ref()
    }

    /// Clock time at which the current fix was accepted.
    #[must_use]
    pub const fn last_update_time_ms(&self) -> Option<u64> {
        self.last_update_time_ms
    }

    /// Overwrite the current fix without running any side effects.
    pub fn set_location(&mut self, fix: LocationFix) {
        self.current_location = Some(fix);
    }

    /// The persisted-state repository.
    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Mutable access to the persisted-state repository.
    pub const fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    /// The places search.
    #[must_use]
    pub const fn places_search(&self) -> &P {
        &self.places_search
    }

    /// The proximity alert registrar.
    #[must_use]
    pub const fn alert_registrar(&self) -> &A {
        &self.alert_registrar
    }

    /// The location source.
    #[must_use]
    pub const fn location_source(&self) -> &L {
        &self.location_source
    }

    /// The clock used for throttling and update timestamps.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Whether `fix` is within the maximum accuracy radius.
    #[must_use]
    pub fn is_accurate(&self, fix: &LocationFix) -> bool {
        LocationAcceptance::new(&self.config).is_accurate(fix)
    }

    /// Whether `fix` should replace the current location.
    #[must_use]
    pub fn is_better_than_current_location(&self, fix: &LocationFix) -> bool {
        LocationAcceptance::new(&self.config).is_better_than(fix, self.current_location.as_ref())
    }

    /// Listener callback for every fix the platform delivers.
    ///
    /// An accepted fix has its out-of-range stores deleted and a poll
    /// attempted, then becomes the current location. Search failures are
    /// reported in the outcome; persistence and alert failures are returned
    /// as errors and leave the current location unchanged.
    pub fn handle_location_updated(
        &mut self,
        fix: LocationFix,
    ) -> Result<UpdateOutcome, StoreManagerError> {
        debug!("location update from {}: {:?}", fix.provider, fix.location);
        if !self.is_better_than_current_location(&fix) {
            return Ok(UpdateOutcome::Rejected);
        }

        let accepted_at_ms = self.clock.now_ms();
        let removed = self.delete_stores_by_location(&fix)?;
        let poll = self.find_stores_by_location(&fix)?;
        self.current_location = Some(fix);
        self.last_update_time_ms = Some(accepted_at_ms);
        Ok(UpdateOutcome::Accepted { removed, poll })
    }

    /// Poll the places service for `fix` unless the last poll was too recent.
    ///
    /// The poll time is recorded before the search runs, so a failed search
    /// still counts against the interval.
    pub fn find_stores_by_location(
        &mut self,
        fix: &LocationFix,
    ) -> Result<PollOutcome, StoreManagerError> {
        let now_ms = self.clock.now_ms();
        let last_poll_ms = self.repository.last_poll_time_ms()?;
        if !poll_is_due(last_poll_ms, now_ms, self.config.min_poll_interval) {
            debug!("skipping places poll; last poll at {last_poll_ms:?}, now {now_ms}");
            return Ok(PollOutcome::Throttled);
        }

        self.repository.set_last_poll_time_ms(now_ms)?;
        info!(
            "polling places around {}, {}",
            fix.latitude(),
            fix.longitude()
        );
        match self.places_search.search_nearby(fix) {
            Ok(places) => {
                let stores = self.on_store_locations_updated(fix, &places)?;
                Ok(PollOutcome::Completed { stores })
            }
            Err(err) => {
                warn!("places search failed: {err}");
                Ok(PollOutcome::SearchFailed(err))
            }
        }
    }

    /// Persist and alert the searched `places` within range of `fix`, then
    /// notify the observer.
    pub fn on_store_locations_updated(
        &mut self,
        fix: &LocationFix,
        places: &[PlaceCandidate],
    ) -> Result<Vec<GroceryStore>, StoreManagerError> {
        let in_range = filter_places_by_distance(fix, places, self.config.search_radius_meters);
        debug!(
            "{} of {} places within {} meters",
            in_range.len(),
            places.len(),
            self.config.search_radius_meters
        );
        let stores = self.persist_grocery_stores(&in_range)?;
        self.add_proximity_alerts(&stores)?;
        if let Some(observer) = self.on_stores_updated.as_mut() {
            observer(fix, &stores);
        }
        Ok(stores)
    }

    /// Insert one row per place, without deduplication.
    pub fn persist_grocery_stores(
        &mut self,
        places: &[PlaceCandidate],
    ) -> Result<Vec<GroceryStore>, StoreManagerError> {
        self.repository.insert_stores(places).map_err(|err| {
            warn!("failed to persist {} stores: {err}", places.len());
            StoreManagerError::from(err)
        })
    }

    /// Delete persisted stores farther than the search radius from `fix`.
    pub fn delete_stores_by_location(
        &mut self,
        fix: &LocationFix,
    ) -> Result<usize, StoreManagerError> {
        let radius = self.config.search_radius_meters;
        let stale: Vec<i64> = self
            .repository
            .stores()?
            .into_iter()
            .filter(|store| distance_meters(fix.location, store.location) > radius)
            .map(|store| store.id)
            .collect();
        if stale.is_empty() {
            return Ok(0);
        }
        let removed = self.repository.delete_stores(&stale).map_err(|err| {
            warn!("failed to delete {} out-of-range stores: {err}", stale.len());
            StoreManagerError::from(err)
        })?;
        debug!("deleted {removed} stores beyond {radius} meters");
        Ok(removed)
    }

    /// Register one proximity alert per store, with request codes counting
    /// up from zero. Earlier alerts are left in place.
    pub fn add_proximity_alerts(
        &mut self,
        stores: &[GroceryStore],
    ) -> Result<usize, StoreManagerError> {
        for (request_code, store) in (0_u32..).zip(stores) {
            debug!("adding proximity alert {request_code} for {}", store.name);
            let alert = ProximityAlert {
                request_code,
                store_name: store.name.clone(),
                location: store.location,
                radius_meters: self.config.geofence_radius_meters,
                expiration: self.config.proximity_alert_expiration,
            };
            self.alert_registrar.add_proximity_alert(&alert)?;
        }
        Ok(stores.len())
    }

    /// Install the location listener unless one is already installed.
    ///
    /// GPS is only requested when `listen_for_gps` is set; network and
    /// passive updates are always requested. Disabled providers are skipped.
    /// If any registration is refused, earlier ones are removed and the
    /// listener stays uninstalled.
    pub fn listen_for_location_updates(
        &mut self,
        listen_for_gps: bool,
    ) -> Result<(), StoreManagerError> {
        if self.listening {
            debug!("location listener already installed");
            return Ok(());
        }
        let registered = if listen_for_gps {
            self.add_listener_for_provider(&LocationProvider::Gps, self.config.min_poll_interval)
        } else {
            Ok(())
        }
        .and_then(|()| self.add_background_listeners());
        if let Err(err) = registered {
            warn!("failed to install location listener: {err}");
            self.location_source.remove_updates();
            return Err(err);
        }
        self.listening = true;
        Ok(())
    }

    /// Drop GPS updates while keeping network and passive ones.
    pub fn remove_gps_listener(&mut self) -> Result<(), StoreManagerError> {
        if !self.listening {
            debug!("no location listener installed");
            return Ok(());
        }
        debug!("removing GPS listener");
        self.location_source.remove_updates();
        self.add_background_listeners()
    }

    /// Whether the location listener is installed.
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    fn add_background_listeners(&mut self) -> Result<(), StoreManagerError> {
        self.add_listener_for_provider(
            &LocationProvider::Network,
            self.config.network_min_update_time,
        )?;
        self.add_listener_for_provider(
            &LocationProvider::Passive,
            self.config.passive_min_update_time,
        )
    }

    fn add_listener_for_provider(
        &mut self,
        provider: &LocationProvider,
        min_time: std::time::Duration,
    ) -> Result<(), StoreManagerError> {
        if !self.location_source.is_provider_enabled(provider) {
            debug!("provider {provider} is disabled");
            return Ok(());
        }
        debug!("requesting {provider} updates every {min_time:?}");
        self.location_source.request_location_updates(
            provider,
            min_time,
            self.config.search_radius_meters,
        )?;
        Ok(())
    }

    /// Every persisted store with its distance from the current location,
    /// nearest first. Without a current location stores keep row order.
    pub fn stores_by_distance(&self) -> Result<Vec<NearbyStore>, StoreManagerError> {
        let stores = self.repository.stores()?;
        let Some(current) = self.current_location.as_ref() else {
            return Ok(stores
                .into_iter()
                .map(|store| NearbyStore {
                    store,
                    distance_meters: None,
                })
                .collect());
        };
        let mut nearby: Vec<(f64, GroceryStore)> = stores
            .into_iter()
            .map(|store| (current.distance_to(store.location), store))
            .collect();
        nearby.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        Ok(nearby
            .into_iter()
            .map(|(distance, store)| NearbyStore {
                store,
                distance_meters: Some(distance),
            })
            .collect())
    }
}
