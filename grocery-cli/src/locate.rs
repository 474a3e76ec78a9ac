//! `locate` command: run one fix through the store manager.

use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use grocery_core::{
    Clock, LocationFix, LocationProvider, PlacesSearch, SqliteGroceryStore, StoreManager,
    StoreManagerConfig, SystemClock,
};
use grocery_data::places::{HttpPlacesSearch, HttpPlacesSearchConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::platform::{CollectedAlerts, NoLocationService};
use crate::report::LocateReport;
use crate::{
    ARG_ACCURACY, ARG_API_KEY, ARG_DATABASE, ARG_LATITUDE, ARG_LONGITUDE,
    ARG_MIN_POLL_INTERVAL_SECS, ARG_PLACES_BASE_URL, ARG_PROVIDER, ARG_SEARCH_RADIUS,
    ARG_TIMESTAMP_MS, CliError, ENV_LOCATE_ACCURACY, ENV_LOCATE_API_KEY, ENV_LOCATE_LATITUDE,
    ENV_LOCATE_LONGITUDE, database_or_default,
};

/// CLI arguments for the `locate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Treat the given position as a location update. Accepted \
                 fixes prune stores that fell out of range, poll the places \
                 service when the poll interval has elapsed and register a \
                 proximity alert for every store found. Prints a JSON report.",
    about = "Handle a location fix"
)]
#[ortho_config(prefix = "GROCERY")]
pub(crate) struct LocateArgs {
    /// Latitude of the fix in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude of the fix in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Horizontal accuracy of the fix in meters.
    #[arg(long = ARG_ACCURACY, value_name = "meters")]
    #[serde(default)]
    pub(crate) accuracy: Option<f32>,
    /// Fix time in milliseconds since the Unix epoch; defaults to now.
    #[arg(long = ARG_TIMESTAMP_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) timestamp_ms: Option<u64>,
    /// Provider that produced the fix (`gps`, `network`, `passive`, ...).
    #[arg(long = ARG_PROVIDER, value_name = "name")]
    #[serde(default)]
    pub(crate) provider: Option<String>,
    /// Path to the SQLite database; created when missing.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// API key for the places service.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Base URL of the places service.
    #[arg(long = ARG_PLACES_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) places_base_url: Option<String>,
    /// Radius in meters within which stores are kept.
    #[arg(long = ARG_SEARCH_RADIUS, value_name = "meters")]
    #[serde(default)]
    pub(crate) search_radius: Option<f64>,
    /// Minimum seconds between places polls.
    #[arg(long = ARG_MIN_POLL_INTERVAL_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) min_poll_interval_secs: Option<u64>,
}

impl LocateArgs {
    pub(crate) fn into_config(self) -> Result<LocateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LocateConfig::try_from(merged)
    }
}

/// Resolved `locate` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct LocateConfig {
    pub(crate) fix: LocationFix,
    pub(crate) database: Utf8PathBuf,
    pub(crate) places: HttpPlacesSearchConfig,
    pub(crate) thresholds: StoreManagerConfig,
}

impl TryFrom<LocateArgs> for LocateConfig {
    type Error = CliError;

    fn try_from(args: LocateArgs) -> Result<Self, Self::Error> {
        let latitude = args.latitude.ok_or(CliError::MissingArgument {
            field: ARG_LATITUDE,
            env: ENV_LOCATE_LATITUDE,
        })?;
        let longitude = args.longitude.ok_or(CliError::MissingArgument {
            field: ARG_LONGITUDE,
            env: ENV_LOCATE_LONGITUDE,
        })?;
        let accuracy = args.accuracy.ok_or(CliError::MissingArgument {
            field: ARG_ACCURACY,
            env: ENV_LOCATE_ACCURACY,
        })?;
        let api_key = args.api_key.ok_or(CliError::MissingArgument {
            field: ARG_API_KEY,
            env: ENV_LOCATE_API_KEY,
        })?;

        let timestamp_ms = args.timestamp_ms.unwrap_or_else(|| SystemClock.now_ms());
        let provider = args
            .provider
            .as_deref()
            .map_or(LocationProvider::Gps, LocationProvider::from);
        let fix = LocationFix::new(
            Coord {
                x: longitude,
                y: latitude,
            },
            accuracy,
            timestamp_ms,
            provider,
        )?;

        let mut thresholds = StoreManagerConfig::default();
        if let Some(radius) = args.search_radius {
            thresholds = thresholds.with_search_radius_meters(radius);
        }
        if let Some(secs) = args.min_poll_interval_secs {
            thresholds = thresholds.with_min_poll_interval(Duration::from_secs(secs));
        }

        let mut places = HttpPlacesSearchConfig::new(api_key)
            .with_radius_meters(thresholds.search_radius_meters);
        if let Some(base_url) = args.places_base_url {
            places = places.with_base_url(base_url);
        }

        Ok(Self {
            fix,
            database: database_or_default(args.database),
            places,
            thresholds,
        })
    }
}

/// Builds the places search for a `locate` invocation.
pub(crate) trait PlacesSearchBuilder {
    fn build(&self, config: &HttpPlacesSearchConfig) -> Result<Box<dyn PlacesSearch>, CliError>;
}

pub(crate) struct DefaultPlacesSearchBuilder;

impl PlacesSearchBuilder for DefaultPlacesSearchBuilder {
    fn build(&self, config: &HttpPlacesSearchConfig) -> Result<Box<dyn PlacesSearch>, CliError> {
        let search = HttpPlacesSearch::with_config(config.clone()).map_err(|source| {
            CliError::BuildPlacesSearch {
                base_url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(search))
    }
}

pub(crate) fn execute_locate(
    args: LocateArgs,
    builder: &dyn PlacesSearchBuilder,
) -> Result<LocateReport, CliError> {
    let config = args.into_config()?;
    locate_with_config(config, builder)
}

pub(crate) fn locate_with_config(
    config: LocateConfig,
    builder: &dyn PlacesSearchBuilder,
) -> Result<LocateReport, CliError> {
    let repository = SqliteGroceryStore::open(&config.database)?;
    let search = builder.build(&config.places)?;
    let mut manager = StoreManager::new(
        NoLocationService,
        search,
        repository,
        CollectedAlerts::default(),
    )
    .with_config(config.thresholds)?;

    let outcome = manager.handle_location_updated(config.fix)?;
    let stores = manager.stores_by_distance()?;
    Ok(LocateReport::new(
        &outcome,
        stores,
        manager.alert_registrar().alerts(),
    ))
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<LocateConfig, CliError> {
    let merged = LocateArgs::merge_from_layers(layers).map_err(CliError::from)?;
    LocateConfig::try_from(merged)
}
