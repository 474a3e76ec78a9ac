//! Data access traits for persisted stores and reminders.
//!
//! [`StoreRepository`] holds the stores discovered by nearby searches and
//! [`ReminderRepository`] the user's shopping reminders. Both are written in
//! batches; a failed batch leaves the repository unchanged.

use thiserror::Error;

use crate::{GroceryStore, PlaceCandidate, Reminder};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteGroceryStore, SqliteGroceryStoreError};

/// Error raised by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// SQLite rejected a statement.
    #[cfg(feature = "store-sqlite")]
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
    /// A stored value could not be represented in the domain model.
    #[error("stored {field} value {value} is out of range")]
    OutOfRange {
        /// Column or key holding the value.
        field: &'static str,
        /// Offending value, rendered for diagnostics.
        value: String,
    },
    /// Any other backend failure.
    #[error("repository backend failed: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

/// Persisted grocery stores.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use grocery_core::{PlaceCandidate, StoreRepository};
/// use grocery_core::test_support::MemoryRepository;
///
/// let mut repository = MemoryRepository::default();
/// let place = PlaceCandidate::new("Grocer", "g1", Coord { x: 0.0, y: 0.0 });
/// let inserted = repository.insert_stores(&[place.clone(), place])?;
/// assert_eq!(inserted.len(), 2);
/// assert_eq!(repository.stores()?.len(), 2);
/// # Ok::<(), grocery_core::RepositoryError>(())
/// ```
pub trait StoreRepository {
    /// Insert one row per place and return the rows as stored.
    ///
    /// No deduplication is performed.
    fn insert_stores(
        &mut self,
        places: &[PlaceCandidate],
    ) -> Result<Vec<GroceryStore>, RepositoryError>;

    /// Delete the rows with the given identifiers, returning how many went.
    fn delete_stores(&mut self, ids: &[i64]) -> Result<usize, RepositoryError>;

    /// All persisted stores in row order.
    fn stores(&self) -> Result<Vec<GroceryStore>, RepositoryError>;
}

/// Persisted shopping reminders.
pub trait ReminderRepository {
    /// Add a reminder. Duplicate descriptions are allowed.
    fn add_reminder(&mut self, description: &str) -> Result<Reminder, RepositoryError>;

    /// All reminders in row order.
    fn reminders(&self) -> Result<Vec<Reminder>, RepositoryError>;

    /// Delete one reminder, returning `1` if it existed and `0` otherwise.
    fn delete_reminder(&mut self, id: i64) -> Result<usize, RepositoryError>;

    /// Delete every reminder with exactly this description.
    fn delete_reminders_by_description(
        &mut self,
        description: &str,
    ) -> Result<usize, RepositoryError>;

    /// Delete every reminder.
    fn delete_all_reminders(&mut self) -> Result<usize, RepositoryError>;
}
