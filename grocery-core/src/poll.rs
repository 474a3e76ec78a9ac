//! Throttling of nearby-places polls.
//!
//! The last poll time is persisted so the interval survives restarts. A poll
//! is allowed only when strictly more than the minimum interval has passed.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::RepositoryError;

/// Wall-clock source in milliseconds since the Unix epoch.
pub trait Clock {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by [`SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            })
    }
}

/// Persistent key-value slot holding the last poll time.
pub trait PollTimeStore {
    /// The last recorded poll time, or `None` if no poll has happened.
    fn last_poll_time_ms(&self) -> Result<Option<u64>, RepositoryError>;

    /// Record `timestamp_ms` as the last poll time.
    fn set_last_poll_time_ms(&mut self, timestamp_ms: u64) -> Result<(), RepositoryError>;
}

/// Whether a poll may run at `now_ms` given the last poll time.
///
/// A missing last poll time counts as the epoch.
///
/// ```
/// use std::time::Duration;
/// use grocery_core::poll_is_due;
///
/// let interval = Duration::from_secs(60);
/// assert!(!poll_is_due(Some(0), 60_000, interval));
/// assert!(poll_is_due(Some(0), 60_001, interval));
/// ```
#[must_use]
pub fn poll_is_due(last_poll_ms: Option<u64>, now_ms: u64, min_interval: Duration) -> bool {
    let elapsed = now_ms.saturating_sub(last_poll_ms.unwrap_or(0));
    Duration::from_millis(elapsed) > min_interval
}
