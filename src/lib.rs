//! Facade crate for the grocery reminder engine.
//!
//! This crate re-exports the core domain types and exposes the SQLite
//! repository and the HTTP places search behind feature flags.

#![forbid(unsafe_code)]

pub use grocery_core::{
    Clock, GroceryStore, LocationAcceptance, LocationFix, LocationFixError, LocationProvider,
    LocationSource, NearbyStore, PlaceCandidate, PlacesSearch, PlacesSearchError, PollOutcome,
    ProximityAlert, ProximityAlertRegistrar, Reminder, ReminderRepository, RepositoryError,
    StoreManager, StoreManagerConfig, StoreManagerError, StoreRepository, SystemClock,
    UpdateOutcome,
};

#[cfg(feature = "store-sqlite")]
pub use grocery_core::{SqliteGroceryStore, SqliteGroceryStoreError};

#[cfg(feature = "http")]
pub use grocery_data::places::{HttpPlacesSearch, HttpPlacesSearchConfig};
