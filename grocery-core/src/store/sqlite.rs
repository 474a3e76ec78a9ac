//! SQLite-backed repository for stores, reminders and the poll timestamp.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use thiserror::Error;

use crate::{
    GroceryStore, PlaceCandidate, PollTimeStore, Reminder, ReminderRepository, RepositoryError,
    StoreRepository,
};

/// SQLite limits bound parameters per statement to 999 by default. Batched
/// deletes are chunked to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

/// Preference key holding the last nearby-places poll time.
const LAST_POLL_TIME_KEY: &str = "last_places_poll_time";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS locations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        places_id TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL
    );
    CREATE TABLE IF NOT EXISTS reminders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        description TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS preferences (
        key TEXT PRIMARY KEY,
        value INTEGER NOT NULL
    );
";

/// Errors raised while opening the SQLite repository.
#[derive(Debug, Error)]
pub enum SqliteGroceryStoreError {
    /// Creating the directory holding the database failed.
    #[error("failed to create parent directory for {path}: {source}")]
    CreateDirectory {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the tables failed.
    #[error("failed to initialise schema: {source}")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Repository persisting stores, reminders and preferences in one SQLite
/// database.
pub struct SqliteGroceryStore {
    connection: Connection,
    path: Option<Utf8PathBuf>,
}

impl fmt::Debug for SqliteGroceryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteGroceryStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteGroceryStore {
    /// Open (or create) the database at `path`, creating parent directories
    /// and tables as needed.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteGroceryStoreError> {
        grocery_fs::ensure_parent_dir(path).map_err(|source| {
            SqliteGroceryStoreError::CreateDirectory {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let connection = Connection::open(path.as_std_path()).map_err(|source| {
            SqliteGroceryStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::initialise(connection, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, SqliteGroceryStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| {
            SqliteGroceryStoreError::OpenDatabase {
                path: Utf8PathBuf::from(":memory:"),
                source,
            }
        })?;
        Self::initialise(connection, None)
    }

    fn initialise(
        connection: Connection,
        path: Option<Utf8PathBuf>,
    ) -> Result<Self, SqliteGroceryStoreError> {
        connection
            .execute_batch(SCHEMA)
            .map_err(|source| SqliteGroceryStoreError::CreateSchema { source })?;
        Ok(Self { connection, path })
    }

    /// Path of the backing file, or `None` for in-memory databases.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }
}

impl StoreRepository for SqliteGroceryStore {
    fn insert_stores(
        &mut self,
        places: &[PlaceCandidate],
    ) -> Result<Vec<GroceryStore>, RepositoryError> {
        if places.is_empty() {
            return Ok(Vec::new());
        }
        let transaction = self.connection.transaction()?;
        let stored = insert_rows(&transaction, places)?;
        transaction.commit()?;
        Ok(stored)
    }

    fn delete_stores(&mut self, ids: &[i64]) -> Result<usize, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let transaction = self.connection.transaction()?;
        let mut deleted = 0;
        for chunk in ids.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let query = format!("DELETE FROM locations WHERE id IN ({placeholders})");
            deleted += transaction.execute(&query, params_from_iter(chunk.iter()))?;
        }
        transaction.commit()?;
        Ok(deleted)
    }

    fn stores(&self) -> Result<Vec<GroceryStore>, RepositoryError> {
        let mut statement = self.connection.prepare(
            "SELECT id, name, places_id, latitude, longitude FROM locations ORDER BY id ASC",
        )?;
        let rows = statement.query_map([], |row| {
            Ok(GroceryStore {
                id: row.get(0)?,
                name: row.get(1)?,
                place_id: row.get(2)?,
                location: Coord {
                    x: row.get(4)?,
                    y: row.get(3)?,
                },
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn insert_rows(
    transaction: &Transaction<'_>,
    places: &[PlaceCandidate],
) -> Result<Vec<GroceryStore>, RepositoryError> {
    let mut statement = transaction.prepare(
        "INSERT INTO locations (name, places_id, latitude, longitude) VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut stored = Vec::with_capacity(places.len());
    for place in places {
        let id = statement.insert(params![
            place.name,
            place.place_id,
            place.location.y,
            place.location.x
        ])?;
        stored.push(GroceryStore::from_candidate(id, place.clone()));
    }
    Ok(stored)
}

impl ReminderRepository for SqliteGroceryStore {
    fn add_reminder(&mut self, description: &str) -> Result<Reminder, RepositoryError> {
        self.connection.execute(
            "INSERT INTO reminders (description) VALUES (?1)",
            [description],
        )?;
        Ok(Reminder {
            id: self.connection.last_insert_rowid(),
            description: description.to_owned(),
        })
    }

    fn reminders(&self) -> Result<Vec<Reminder>, RepositoryError> {
        let mut statement = self
            .connection
            .prepare("SELECT id, description FROM reminders ORDER BY id ASC")?;
        let rows = statement.query_map([], |row| {
            Ok(Reminder {
                id: row.get(0)?,
                description: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_reminder(&mut self, id: i64) -> Result<usize, RepositoryError> {
        Ok(self
            .connection
            .execute("DELETE FROM reminders WHERE id = ?1", [id])?)
    }

    fn delete_reminders_by_description(
        &mut self,
        description: &str,
    ) -> Result<usize, RepositoryError> {
        Ok(self
            .connection
            .execute("DELETE FROM reminders WHERE description = ?1", [description])?)
    }

    fn delete_all_reminders(&mut self) -> Result<usize, RepositoryError> {
        Ok(self.connection.execute("DELETE FROM reminders", [])?)
    }
}

impl PollTimeStore for SqliteGroceryStore {
    fn last_poll_time_ms(&self) -> Result<Option<u64>, RepositoryError> {
        let stored: Option<i64> = self
            .connection
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [LAST_POLL_TIME_KEY],
                |row| row.get(0),
            )
            .optional()?;
        stored
            .map(|value| {
                u64::try_from(value).map_err(|_| RepositoryError::OutOfRange {
                    field: LAST_POLL_TIME_KEY,
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    fn set_last_poll_time_ms(&mut self, timestamp_ms: u64) -> Result<(), RepositoryError> {
        let value = i64::try_from(timestamp_ms).map_err(|_| RepositoryError::OutOfRange {
            field: LAST_POLL_TIME_KEY,
            value: timestamp_ms.to_string(),
        })?;
        self.connection.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![LAST_POLL_TIME_KEY, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    fn place(name: &str, x: f64, y: f64) -> PlaceCandidate {
        PlaceCandidate::new(name, format!("{name}-id"), Coord { x, y })
    }

    #[fixture]
    fn repository() -> SqliteGroceryStore {
        SqliteGroceryStore::open_in_memory().expect("open in-memory database")
    }

    #[rstest]
    fn stores_round_trip_coordinates(mut repository: SqliteGroceryStore) {
        let inserted = repository
            .insert_stores(&[place("Grocer", -0.12, 51.5)])
            .expect("insert");
        let stored = repository.stores().expect("stores");
        assert_eq!(stored, inserted);
        assert_eq!(stored[0].location, Coord { x: -0.12, y: 51.5 });
    }

    #[rstest]
    fn duplicate_places_create_separate_rows(mut repository: SqliteGroceryStore) {
        let grocer = place("Grocer", 0.0, 0.0);
        repository.insert_stores(&[grocer.clone()]).expect("insert");
        repository.insert_stores(&[grocer]).expect("insert again");
        assert_eq!(repository.stores().expect("stores").len(), 2);
    }

    #[rstest]
    fn deletes_only_requested_rows(mut repository: SqliteGroceryStore) {
        let stored = repository
            .insert_stores(&[place("A", 0.0, 0.0), place("B", 1.0, 1.0)])
            .expect("insert");
        let deleted = repository.delete_stores(&[stored[0].id]).expect("delete");
        assert_eq!(deleted, 1);
        let left = repository.stores().expect("stores");
        assert_eq!(left, vec![stored[1].clone()]);
    }

    #[rstest]
    fn empty_batches_are_no_ops(mut repository: SqliteGroceryStore) {
        assert!(repository.insert_stores(&[]).expect("insert").is_empty());
        assert_eq!(repository.delete_stores(&[]).expect("delete"), 0);
    }

    #[rstest]
    fn poll_time_is_absent_until_written(mut repository: SqliteGroceryStore) {
        assert_eq!(repository.last_poll_time_ms().expect("read"), None);
        repository.set_last_poll_time_ms(42).expect("write");
        repository.set_last_poll_time_ms(43).expect("overwrite");
        assert_eq!(repository.last_poll_time_ms().expect("read"), Some(43));
    }

    #[rstest]
    fn poll_time_beyond_i64_is_rejected(mut repository: SqliteGroceryStore) {
        let err = repository
            .set_last_poll_time_ms(u64::MAX)
            .expect_err("out of range");
        assert!(matches!(err, RepositoryError::OutOfRange { .. }));
    }

    #[rstest]
    fn reminder_ids_start_at_one(mut repository: SqliteGroceryStore) {
        let reminder = repository.add_reminder("bread").expect("add");
        assert_eq!(reminder.id, 1);
        assert_eq!(repository.delete_reminder(reminder.id).expect("delete"), 1);
        assert_eq!(repository.delete_reminder(reminder.id).expect("delete"), 0);
    }

    #[rstest]
    fn open_creates_missing_directories() {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8Path::from_path(dir.path()).expect("utf-8 temp dir");
        let path = root.join("nested/grocery.db");
        let mut repository = SqliteGroceryStore::open(&path).expect("open");
        repository.add_reminder("tea").expect("add");
        drop(repository);

        let reopened = SqliteGroceryStore::open(&path).expect("reopen");
        assert_eq!(reopened.reminders().expect("reminders").len(), 1);
        assert_eq!(reopened.path(), Some(path.as_path()));
    }
}
