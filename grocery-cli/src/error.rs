//! Error types emitted by the grocery CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use grocery_core::{
    LocationFixError, RepositoryError, SqliteGroceryStoreError, StoreManagerError,
};
use grocery_data::places::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the grocery CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// Only one half of a coordinate pair was supplied.
    #[error("--latitude and --longitude must be given together")]
    IncompleteLocation,
    /// `forget` was run without saying what to forget.
    #[error("forget needs --id, --description or --all")]
    NothingToForget,
    /// The supplied fix is not a valid position.
    #[error("invalid location: {0}")]
    InvalidFix(#[from] LocationFixError),
    /// The database does not exist.
    #[error("database {path:?} does not exist")]
    MissingDatabase { path: Utf8PathBuf },
    /// The database path exists but is not a file.
    #[error("database path {path:?} exists but is not a file")]
    DatabaseNotFile { path: Utf8PathBuf },
    /// The database path could not be inspected due to an IO error.
    #[error("failed to inspect database path {path:?}: {source}")]
    InspectDatabase {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the database failed.
    #[error(transparent)]
    OpenDatabase(#[from] SqliteGroceryStoreError),
    /// Reading or writing reminders failed.
    #[error("reminder storage failed: {0}")]
    Repository(#[from] RepositoryError),
    /// The store manager rejected its configuration or failed to persist.
    #[error(transparent)]
    StoreManager(#[from] StoreManagerError),
    /// Constructing the places search failed.
    #[error("failed to build places search for {base_url:?}: {source}")]
    BuildPlacesSearch {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
