//! Thresholds steering the store manager.

use std::time::Duration;

use thiserror::Error;

/// Default upper bound on fix accuracy, in meters.
pub const DEFAULT_MAXIMUM_ACCURACY_METERS: f32 = 100.0;
/// Default recency needed for a fix to supersede the current one.
pub const DEFAULT_SIGNIFICANT_TIME_DELTA: Duration = Duration::from_secs(2 * 60);
/// Default accuracy ratio at or below which a fix is significantly better.
pub const DEFAULT_SIGNIFICANT_ACCURACY_RATIO: f32 = 0.5;
/// Default minimum interval between nearby-places polls.
pub const DEFAULT_MIN_POLL_INTERVAL: Duration = Duration::from_secs(10 * 60);
/// Default minimum time between network provider updates.
pub const DEFAULT_NETWORK_MIN_UPDATE_TIME: Duration = Duration::from_secs(5 * 60);
/// Default minimum time between passive provider updates.
pub const DEFAULT_PASSIVE_MIN_UPDATE_TIME: Duration = Duration::from_secs(60);
/// Default radius around the current fix in which stores are kept.
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 1000.0;
/// Default radius of each proximity alert.
pub const DEFAULT_GEOFENCE_RADIUS_METERS: f32 = 50.0;

/// Errors returned by [`StoreManagerConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreManagerConfigError {
    /// A distance or accuracy threshold was zero, negative or not finite.
    #[error("{field} must be a positive number of meters")]
    NonPositiveDistance {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The accuracy ratio was outside `(0, 1]`.
    #[error("significant accuracy ratio {0} must be in (0, 1]")]
    InvalidAccuracyRatio(f32),
}

/// Tunables for location acceptance, polling and alert registration.
///
/// # Examples
/// ```
/// use grocery_core::StoreManagerConfig;
///
/// let config = StoreManagerConfig::default().with_search_radius_meters(500.0);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.search_radius_meters, 500.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StoreManagerConfig {
    /// Fixes less accurate than this are rejected outright.
    pub maximum_accuracy_meters: f32,
    /// A fix at least this much newer than the current one is accepted.
    pub significant_time_delta: Duration,
    /// A fix whose accuracy divided by the current accuracy is at most this
    /// value is accepted.
    pub significant_accuracy_ratio: f32,
    /// Minimum time between nearby-places polls. Also the GPS update period.
    pub min_poll_interval: Duration,
    /// Update period requested from the network provider.
    pub network_min_update_time: Duration,
    /// Update period requested from the passive provider.
    pub passive_min_update_time: Duration,
    /// Radius within which searched stores are kept.
    pub search_radius_meters: f64,
    /// Radius of every registered proximity alert.
    pub geofence_radius_meters: f32,
    /// Lifetime of every registered proximity alert; `None` never expires.
    pub proximity_alert_expiration: Option<Duration>,
}

impl Default for StoreManagerConfig {
    fn default() -> Self {
        Self {
            maximum_accuracy_meters: DEFAULT_MAXIMUM_ACCURACY_METERS,
            significant_time_delta: DEFAULT_SIGNIFICANT_TIME_DELTA,
            significant_accuracy_ratio: DEFAULT_SIGNIFICANT_ACCURACY_RATIO,
            min_poll_interval: DEFAULT_MIN_POLL_INTERVAL,
            network_min_update_time: DEFAULT_NETWORK_MIN_UPDATE_TIME,
            passive_min_update_time: DEFAULT_PASSIVE_MIN_UPDATE_TIME,
            search_radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            geofence_radius_meters: DEFAULT_GEOFENCE_RADIUS_METERS,
            proximity_alert_expiration: None,
        }
    }
}

impl StoreManagerConfig {
    /// Set the store search radius.
    #[must_use]
    pub const fn with_search_radius_meters(mut self, radius: f64) -> Self {
        self.search_radius_meters = radius;
        self
    }

    /// Set the minimum interval between polls.
    #[must_use]
    pub const fn with_min_poll_interval(mut self, interval: Duration) -> Self {
        self.min_poll_interval = interval;
        self
    }

    /// Set the maximum accepted fix accuracy.
    #[must_use]
    pub const fn with_maximum_accuracy_meters(mut self, accuracy: f32) -> Self {
        self.maximum_accuracy_meters = accuracy;
        self
    }

    /// Set the proximity alert radius and expiration.
    #[must_use]
    pub const fn with_geofence(mut self, radius_meters: f32, expiration: Option<Duration>) -> Self {
        self.geofence_radius_meters = radius_meters;
        self.proximity_alert_expiration = expiration;
        self
    }

    /// Check every threshold is usable.
    pub fn validate(&self) -> Result<(), StoreManagerConfigError> {
        if !is_positive(f64::from(self.maximum_accuracy_meters)) {
            return Err(StoreManagerConfigError::NonPositiveDistance {
                field: "maximum_accuracy_meters",
            });
        }
        if !is_positive(self.search_radius_meters) {
            return Err(StoreManagerConfigError::NonPositiveDistance {
                field: "search_radius_meters",
            });
        }
        if !is_positive(f64::from(self.geofence_radius_meters)) {
            return Err(StoreManagerConfigError::NonPositiveDistance {
                field: "geofence_radius_meters",
            });
        }
        let ratio = self.significant_accuracy_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
            return Err(StoreManagerConfigError::InvalidAccuracyRatio(ratio));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_are_valid() {
        assert_eq!(StoreManagerConfig::default().validate(), Ok(()));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    #[case(f64::NAN)]
    fn rejects_unusable_search_radius(#[case] radius: f64) {
        let config = StoreManagerConfig::default().with_search_radius_meters(radius);
        assert_eq!(
            config.validate(),
            Err(StoreManagerConfigError::NonPositiveDistance {
                field: "search_radius_meters"
            })
        );
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.5)]
    fn rejects_out_of_range_ratio(#[case] ratio: f32) {
        let config = StoreManagerConfig {
            significant_accuracy_ratio: ratio,
            ..StoreManagerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StoreManagerConfigError::InvalidAccuracyRatio(_))
        ));
    }

    #[rstest]
    fn ratio_of_one_is_allowed() {
        let config = StoreManagerConfig {
            significant_accuracy_ratio: 1.0,
            ..StoreManagerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
