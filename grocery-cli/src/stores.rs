//! `stores` command: list persisted stores.

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use grocery_core::{LocationFix, LocationProvider, SqliteGroceryStore, StoreManager};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::platform::{CollectedAlerts, NoLocationService, NoPlacesSearch};
use crate::report::StoreReport;
use crate::{
    ARG_DATABASE, ARG_LATITUDE, ARG_LONGITUDE, CliError, database_or_default, require_database,
};

/// Provider name recorded for positions typed on the command line.
const MANUAL_PROVIDER: &str = "manual";

/// CLI arguments for the `stores` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print every store persisted by earlier `locate` runs. With \
                 --latitude and --longitude the list is sorted nearest first \
                 and each entry carries its distance in meters.",
    about = "List persisted stores"
)]
#[ortho_config(prefix = "GROCERY")]
pub(crate) struct StoresArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Latitude to measure distances from.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude to measure distances from.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
}

/// Resolved `stores` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoresConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) origin: Option<Coord<f64>>,
}

impl TryFrom<StoresArgs> for StoresConfig {
    type Error = CliError;

    fn try_from(args: StoresArgs) -> Result<Self, Self::Error> {
        let origin = match (args.latitude, args.longitude) {
            (Some(y), Some(x)) => Some(Coord { x, y }),
            (None, None) => None,
            _ => return Err(CliError::IncompleteLocation),
        };
        Ok(Self {
            database: database_or_default(args.database),
            origin,
        })
    }
}

pub(crate) fn execute_stores(args: StoresArgs) -> Result<Vec<StoreReport>, CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = StoresConfig::try_from(merged)?;
    list_stores(&config)
}

pub(crate) fn list_stores(config: &StoresConfig) -> Result<Vec<StoreReport>, CliError> {
    require_database(&config.database)?;
    let repository = SqliteGroceryStore::open(&config.database)?;
    let mut manager = StoreManager::new(
        NoLocationService,
        NoPlacesSearch,
        repository,
        CollectedAlerts::default(),
    );
    if let Some(origin) = config.origin {
        let fix = LocationFix::new(origin, 0.0, 0, LocationProvider::from(MANUAL_PROVIDER))?;
        manager.set_location(fix);
    }
    Ok(manager
        .stores_by_distance()?
        .into_iter()
        .map(StoreReport::from)
        .collect())
}
