//! JSON documents printed by the CLI commands.

use grocery_core::{NearbyStore, PollOutcome, ProximityAlert, UpdateOutcome};
use serde::{Deserialize, Serialize};

/// Outcome of the `locate` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LocateReport {
    /// Whether the fix became the current location.
    pub(crate) accepted: bool,
    /// Persisted stores deleted for being out of range.
    pub(crate) removed: usize,
    /// What happened to the places poll.
    pub(crate) poll: PollStatus,
    /// Why the search failed, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) search_error: Option<String>,
    /// Stores inserted by this poll.
    pub(crate) added: usize,
    /// Every persisted store, nearest first.
    pub(crate) stores: Vec<StoreReport>,
    /// Alerts registered by this poll.
    pub(crate) alerts: Vec<AlertReport>,
}

impl LocateReport {
    pub(crate) fn new(
        outcome: &UpdateOutcome,
        stores: Vec<NearbyStore>,
        alerts: &[ProximityAlert],
    ) -> Self {
        let (accepted, removed, poll) = match outcome {
            UpdateOutcome::Rejected => (false, 0, None),
            UpdateOutcome::Accepted { removed, poll } => (true, *removed, Some(poll)),
        };
        let (poll, search_error, added) = match poll {
            None => (PollStatus::Skipped, None, 0),
            Some(PollOutcome::Throttled) => (PollStatus::Throttled, None, 0),
            Some(PollOutcome::Completed { stores }) => (PollStatus::Completed, None, stores.len()),
            Some(PollOutcome::SearchFailed(err)) => {
                (PollStatus::SearchFailed, Some(err.to_string()), 0)
            }
        };
        Self {
            accepted,
            removed,
            poll,
            search_error,
            added,
            stores: stores.into_iter().map(StoreReport::from).collect(),
            alerts: alerts.iter().map(AlertReport::from).collect(),
        }
    }
}

/// Poll status reported by `locate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PollStatus {
    /// The fix was rejected so no poll was attempted.
    Skipped,
    /// The previous poll was too recent.
    Throttled,
    /// The search ran and its results were stored.
    Completed,
    /// The search failed.
    SearchFailed,
}

/// A persisted store as printed by `locate` and `stores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoreReport {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) place_id: String,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) distance_meters: Option<f64>,
}

impl From<NearbyStore> for StoreReport {
    fn from(nearby: NearbyStore) -> Self {
        let NearbyStore {
            store,
            distance_meters,
        } = nearby;
        Self {
            id: store.id,
            name: store.name,
            place_id: store.place_id,
            latitude: store.location.y,
            longitude: store.location.x,
            distance_meters,
        }
    }
}

/// A registered proximity alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AlertReport {
    pub(crate) request_code: u32,
    pub(crate) store_name: String,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) radius_meters: f32,
    /// Seconds until the alert lapses; absent when it never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) expiration_secs: Option<u64>,
}

impl From<&ProximityAlert> for AlertReport {
    fn from(alert: &ProximityAlert) -> Self {
        Self {
            request_code: alert.request_code,
            store_name: alert.store_name.clone(),
            latitude: alert.location.y,
            longitude: alert.location.x,
            radius_meters: alert.radius_meters,
            expiration_secs: alert.expiration.map(|expiration| expiration.as_secs()),
        }
    }
}

/// Output of `forget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ForgetReport {
    /// Reminders deleted.
    pub(crate) deleted: usize,
}
