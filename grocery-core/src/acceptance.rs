//! Decide whether a new fix supersedes the currently accepted one.
//!
//! A candidate must first be accurate enough. With no current fix it is
//! accepted; otherwise it needs to be either significantly newer or
//! significantly more accurate than the current fix.

use std::time::Duration;

use log::debug;

use crate::{LocationFix, StoreManagerConfig};

/// Location acceptance heuristic parameterised by [`StoreManagerConfig`].
///
/// # Examples
/// ```
/// use geo::Coord;
/// use grocery_core::{LocationAcceptance, LocationFix, LocationProvider, StoreManagerConfig};
///
/// let config = StoreManagerConfig::default();
/// let acceptance = LocationAcceptance::new(&config);
/// let fix = LocationFix::new(Coord { x: 0.0, y: 0.0 }, 10.0, 0, LocationProvider::Gps).unwrap();
/// assert!(acceptance.is_better_than(&fix, None));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LocationAcceptance<'a> {
    config: &'a StoreManagerConfig,
}

impl<'a> LocationAcceptance<'a> {
    /// Borrow the thresholds from `config`.
    #[must_use]
    pub const fn new(config: &'a StoreManagerConfig) -> Self {
        Self { config }
    }

    /// Whether `fix` is within the maximum accuracy radius.
    #[must_use]
    pub fn is_accurate(&self, fix: &LocationFix) -> bool {
        fix.accuracy <= self.config.maximum_accuracy_meters
    }

    /// Whether `candidate` should replace `current`.
    #[must_use]
    pub fn is_better_than(&self, candidate: &LocationFix, current: Option<&LocationFix>) -> bool {
        if !self.is_accurate(candidate) {
            debug!(
                "location accuracy {} exceeds {} meters",
                candidate.accuracy, self.config.maximum_accuracy_meters
            );
            return false;
        }

        let Some(current) = current else {
            return true;
        };

        self.is_significantly_newer(current, candidate)
            || self.is_significantly_more_accurate(current, candidate)
    }

    /// Whether `candidate` is at least the significant time delta newer.
    ///
    /// Candidates older than `current` are never significantly newer.
    #[must_use]
    pub fn is_significantly_newer(&self, current: &LocationFix, candidate: &LocationFix) -> bool {
        let newer = candidate
            .timestamp_ms
            .checked_sub(current.timestamp_ms)
            .is_some_and(|delta| {
                Duration::from_millis(delta) >= self.config.significant_time_delta
            });
        debug!(
            "fix is {}significantly newer (current {}ms, candidate {}ms)",
            if newer { "" } else { "not " },
            current.timestamp_ms,
            candidate.timestamp_ms
        );
        newer
    }

    /// Whether `candidate.accuracy / current.accuracy` is at most the
    /// significant ratio.
    ///
    /// A current accuracy of zero cannot be improved upon.
    #[must_use]
    pub fn is_significantly_more_accurate(
        &self,
        current: &LocationFix,
        candidate: &LocationFix,
    ) -> bool {
        if current.accuracy <= 0.0 {
            return false;
        }
        let ratio = candidate.accuracy / current.accuracy;
        let more_accurate = ratio <= self.config.significant_accuracy_ratio;
        debug!(
            "accuracy ratio {ratio} against {} is {}significant",
            self.config.significant_accuracy_ratio,
            if more_accurate { "" } else { "not " }
        );
        more_accurate
    }
}
