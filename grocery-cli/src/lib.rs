//! Command-line interface for the grocery reminder engine.
//!
//! The `grocery` binary feeds location fixes through the store manager,
//! lists the stores it has persisted and manages the reminder list. Every
//! subcommand layers its options from CLI flags, `GROCERY_CMDS_*`
//! environment variables and configuration files.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod locate;
mod platform;
mod reminders;
mod report;
mod stores;

pub use error::CliError;

use locate::{DefaultPlacesSearchBuilder, LocateArgs, PlacesSearchBuilder};
use reminders::{ForgetArgs, RemindArgs, RemindersArgs};
use stores::StoresArgs;

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_LATITUDE: &str = "latitude";
pub(crate) const ARG_LONGITUDE: &str = "longitude";
pub(crate) const ARG_ACCURACY: &str = "accuracy";
pub(crate) const ARG_TIMESTAMP_MS: &str = "timestamp-ms";
pub(crate) const ARG_PROVIDER: &str = "provider";
pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_PLACES_BASE_URL: &str = "places-base-url";
pub(crate) const ARG_SEARCH_RADIUS: &str = "search-radius";
pub(crate) const ARG_MIN_POLL_INTERVAL_SECS: &str = "min-poll-interval-secs";
pub(crate) const ARG_DESCRIPTION: &str = "description";
pub(crate) const ENV_LOCATE_LATITUDE: &str = "GROCERY_CMDS_LOCATE_LATITUDE";
pub(crate) const ENV_LOCATE_LONGITUDE: &str = "GROCERY_CMDS_LOCATE_LONGITUDE";
pub(crate) const ENV_LOCATE_ACCURACY: &str = "GROCERY_CMDS_LOCATE_ACCURACY";
pub(crate) const ENV_LOCATE_API_KEY: &str = "GROCERY_CMDS_LOCATE_API_KEY";
pub(crate) const ENV_REMIND_DESCRIPTION: &str = "GROCERY_CMDS_REMIND_DESCRIPTION";

/// Database file used when no `--database` is configured.
pub(crate) const DEFAULT_DATABASE: &str = "grocery.db";

/// Run the grocery CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &DefaultPlacesSearchBuilder, &mut stdout)
}

pub(crate) fn run_command(
    command: Command,
    places: &dyn PlacesSearchBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Locate(args) => {
            let report = locate::execute_locate(args, places)?;
            write_json(writer, &report)
        }
        Command::Stores(args) => write_json(writer, &stores::execute_stores(args)?),
        Command::Remind(args) => write_json(writer, &reminders::execute_remind(args)?),
        Command::Reminders(args) => write_json(writer, &reminders::execute_reminders(args)?),
        Command::Forget(args) => write_json(writer, &reminders::execute_forget(args)?),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "grocery",
    about = "Find nearby grocery stores and keep a shopping reminder list",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Handle a location fix: prune, poll and alert nearby stores.
    Locate(LocateArgs),
    /// List persisted stores, nearest first when a location is given.
    Stores(StoresArgs),
    /// Add a reminder.
    Remind(RemindArgs),
    /// List reminders.
    Reminders(RemindersArgs),
    /// Delete reminders by id, by description, or all of them.
    Forget(ForgetArgs),
}

/// Resolve the configured database path, falling back to [`DEFAULT_DATABASE`].
pub(crate) fn database_or_default(database: Option<Utf8PathBuf>) -> Utf8PathBuf {
    database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE))
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_database(path: &Utf8Path) -> Result<(), CliError> {
    match grocery_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::DatabaseNotFile {
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingDatabase {
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectDatabase {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
