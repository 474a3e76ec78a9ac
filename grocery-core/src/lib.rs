//! Core domain types and decision logic for the grocery reminder engine.
//!
//! The crate decides which location fixes to trust, when to ask a
//! nearby-places service for grocery stores, which stores to keep, and
//! which proximity alerts to register. Platform facilities (location
//! updates, the places service, storage and alerts) sit behind traits so
//! the logic runs the same against a handset, the CLI or tests.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod acceptance;
mod config;
mod location;
mod manager;
mod place;
pub mod places_search;
mod poll;
mod proximity;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use acceptance::LocationAcceptance;
pub use config::{
    DEFAULT_GEOFENCE_RADIUS_METERS, DEFAULT_MAXIMUM_ACCURACY_METERS, DEFAULT_MIN_POLL_INTERVAL,
    DEFAULT_NETWORK_MIN_UPDATE_TIME, DEFAULT_PASSIVE_MIN_UPDATE_TIME, DEFAULT_SEARCH_RADIUS_METERS,
    DEFAULT_SIGNIFICANT_ACCURACY_RATIO, DEFAULT_SIGNIFICANT_TIME_DELTA, StoreManagerConfig,
    StoreManagerConfigError,
};
pub use location::{
    LocationFix, LocationFixError, LocationProvider, LocationSource, LocationSourceError,
    distance_meters,
};
pub use manager::{
    PollOutcome, StoreManager, StoreManagerError, StoresUpdatedObserver, UpdateOutcome,
};
pub use place::{GroceryStore, NearbyStore, PlaceCandidate, Reminder, filter_places_by_distance};
pub use places_search::{PlacesSearch, PlacesSearchError};
pub use poll::{Clock, PollTimeStore, SystemClock, poll_is_due};
pub use proximity::{ProximityAlert, ProximityAlertError, ProximityAlertRegistrar};
pub use store::{ReminderRepository, RepositoryError, StoreRepository};

#[cfg(feature = "store-sqlite")]
pub use store::{SqliteGroceryStore, SqliteGroceryStoreError};
