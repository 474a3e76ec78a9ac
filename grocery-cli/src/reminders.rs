//! Reminder list commands: `remind`, `reminders` and `forget`.

use camino::Utf8PathBuf;
use clap::Parser;
use grocery_core::{Reminder, ReminderRepository, SqliteGroceryStore};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::report::ForgetReport;
use crate::{
    ARG_DATABASE, ARG_DESCRIPTION, CliError, ENV_REMIND_DESCRIPTION, database_or_default,
    require_database,
};

/// CLI arguments for the `remind` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Add an item to the reminder list")]
#[ortho_config(prefix = "GROCERY")]
pub(crate) struct RemindArgs {
    /// What to buy.
    #[arg(value_name = ARG_DESCRIPTION)]
    #[serde(default)]
    pub(crate) description: Option<String>,
    /// Path to the SQLite database; created when missing.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// CLI arguments for the `reminders` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List reminders, oldest first")]
#[ortho_config(prefix = "GROCERY")]
pub(crate) struct RemindersArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// CLI arguments for the `forget` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Delete reminders. Exactly one selector is honoured, checked \
                 in the order --all, --id, --description.",
    about = "Delete reminders"
)]
#[ortho_config(prefix = "GROCERY")]
pub(crate) struct ForgetArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Delete the reminder with this id.
    #[arg(long, value_name = "id")]
    #[serde(default)]
    pub(crate) id: Option<i64>,
    /// Delete every reminder with exactly this description.
    #[arg(long = ARG_DESCRIPTION, value_name = "text")]
    #[serde(default)]
    pub(crate) description: Option<String>,
    /// Delete every reminder.
    #[arg(long)]
    #[serde(default)]
    pub(crate) all: bool,
}

/// Which reminders `forget` deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ForgetSelector {
    All,
    Id(i64),
    Description(String),
}

impl TryFrom<&ForgetArgs> for ForgetSelector {
    type Error = CliError;

    fn try_from(args: &ForgetArgs) -> Result<Self, Self::Error> {
        if args.all {
            return Ok(Self::All);
        }
        if let Some(id) = args.id {
            return Ok(Self::Id(id));
        }
        args.description
            .clone()
            .map(Self::Description)
            .ok_or(CliError::NothingToForget)
    }
}

pub(crate) fn execute_remind(args: RemindArgs) -> Result<Reminder, CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let description = merged.description.ok_or(CliError::MissingArgument {
        field: ARG_DESCRIPTION,
        env: ENV_REMIND_DESCRIPTION,
    })?;
    let mut store = SqliteGroceryStore::open(&database_or_default(merged.database))?;
    Ok(store.add_reminder(&description)?)
}

pub(crate) fn execute_reminders(args: RemindersArgs) -> Result<Vec<Reminder>, CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let database = database_or_default(merged.database);
    require_database(&database)?;
    let store = SqliteGroceryStore::open(&database)?;
    Ok(store.reminders()?)
}

pub(crate) fn execute_forget(args: ForgetArgs) -> Result<ForgetReport, CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let selector = ForgetSelector::try_from(&merged)?;
    let database = database_or_default(merged.database);
    require_database(&database)?;
    let mut store = SqliteGroceryStore::open(&database)?;
    forget(&mut store, &selector)
}

pub(crate) fn forget<R: ReminderRepository>(
    repository: &mut R,
    selector: &ForgetSelector,
) -> Result<ForgetReport, CliError> {
    let deleted = match selector {
        ForgetSelector::All => repository.delete_all_reminders()?,
        ForgetSelector::Id(id) => repository.delete_reminder(*id)?,
        ForgetSelector::Description(text) => repository.delete_reminders_by_description(text)?,
    };
    Ok(ForgetReport { deleted })
}
