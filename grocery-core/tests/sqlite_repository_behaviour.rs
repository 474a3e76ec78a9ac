//! Behavioural tests for the SQLite-backed repository.

use std::cell::{Cell, RefCell};

use camino::Utf8PathBuf;
use geo::Coord;
use grocery_core::{
    PlaceCandidate, PollTimeStore, ReminderRepository, SqliteGroceryStore, StoreRepository,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

const POLL_TIME_MS: u64 = 1_700_000_123_456;

#[derive(Default)]
struct RepositoryWorld {
    dir: RefCell<Option<TempDir>>,
    store: RefCell<Option<SqliteGroceryStore>>,
    deleted: Cell<usize>,
}

impl RepositoryWorld {
    fn database_path(&self) -> Utf8PathBuf {
        let dir = self.dir.borrow();
        let dir = dir.as_ref().expect("database directory should exist");
        Utf8PathBuf::from_path_buf(dir.path().join("data").join("grocery.db"))
            .expect("temporary path should be UTF-8")
    }

    fn with_store<T>(&self, action: impl FnOnce(&mut SqliteGroceryStore) -> T) -> T {
        let mut guard = self.store.borrow_mut();
        let store = guard.as_mut().expect("database should be open");
        action(store)
    }
}

#[fixture]
fn world() -> RepositoryWorld {
    RepositoryWorld::default()
}

#[given("a fresh database file")]
fn fresh_database(world: &RepositoryWorld) {
    world
        .dir
        .replace(Some(TempDir::new().expect("create temp dir")));
    let store = SqliteGroceryStore::open(&world.database_path()).expect("open database");
    world.store.replace(Some(store));
}

#[when("two stores and a poll time are written")]
fn write_stores_and_poll_time(world: &RepositoryWorld) {
    world.with_store(|store| {
        store
            .insert_stores(&[
                PlaceCandidate::new("Bakery Lane", "bakery", Coord { x: 0.1, y: 51.4 }),
                PlaceCandidate::new("Fruit Market", "fruit", Coord { x: 0.2, y: 51.5 }),
            ])
            .expect("insert stores");
        store
            .set_last_poll_time_ms(POLL_TIME_MS)
            .expect("record poll time");
    });
}

#[when("the database is reopened")]
fn reopen(world: &RepositoryWorld) {
    world.store.replace(None);
    let store = SqliteGroceryStore::open(&world.database_path()).expect("reopen database");
    world.store.replace(Some(store));
}

#[when("reminders for milk, milk and eggs are added")]
fn add_reminders(world: &RepositoryWorld) {
    world.with_store(|store| {
        for description in ["milk", "milk", "eggs"] {
            store.add_reminder(description).expect("add reminder");
        }
    });
}

#[when("reminders for milk are deleted")]
fn delete_milk(world: &RepositoryWorld) {
    let deleted = world.with_store(|store| {
        store
            .delete_reminders_by_description("milk")
            .expect("delete reminders")
    });
    world.deleted.set(deleted);
}

#[then("both stores are listed in insertion order")]
fn stores_in_order(world: &RepositoryWorld) {
    let names: Vec<String> = world.with_store(|store| {
        store
            .stores()
            .expect("list stores")
            .into_iter()
            .map(|grocery| grocery.name)
            .collect()
    });
    assert_eq!(names, ["Bakery Lane", "Fruit Market"]);
}

#[then("the poll time is restored")]
fn poll_time_restored(world: &RepositoryWorld) {
    let restored = world.with_store(|store| store.last_poll_time_ms().expect("read poll time"));
    assert_eq!(restored, Some(POLL_TIME_MS));
}

#[then("two reminders were deleted")]
fn two_deleted(world: &RepositoryWorld) {
    assert_eq!(world.deleted.get(), 2);
}

#[then("only the eggs reminder remains")]
fn eggs_remain(world: &RepositoryWorld) {
    let remaining = world.with_store(|store| store.reminders().expect("list reminders"));
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].to_string(), "eggs");
}

#[scenario(path = "tests/features/sqlite_repository.feature", index = 0)]
fn state_survives_reopen(world: RepositoryWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_repository.feature", index = 1)]
fn reminders_removed_by_description(world: RepositoryWorld) {
    let _ = world;
}
