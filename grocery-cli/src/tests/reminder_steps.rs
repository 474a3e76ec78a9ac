//! Behaviour-driven step definitions for the reminder list commands.

use super::helpers::{StubPlacesBuilder, Workspace, run_argv};
use super::*;
use crate::report::ForgetReport;
use grocery_core::Reminder;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct ReminderWorld {
    workspace: Workspace,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl ReminderWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn run(&self, command: &str, extra: &[&str]) -> Result<(), CliError> {
        let mut argv = vec![
            "grocery".to_string(),
            command.to_string(),
            format!("--{ARG_DATABASE}={}", self.workspace.database),
        ];
        argv.extend(extra.iter().map(|arg| (*arg).to_string()));
        let mut stdout = self.stdout.borrow_mut();
        stdout.clear();
        run_argv(&argv, &StubPlacesBuilder::default(), &mut stdout)
    }

    fn record(&self, command: &str, extra: &[&str]) {
        let outcome = self.run(command, extra);
        self.result.replace(Some(outcome));
    }

    fn succeeded(&self) {
        let borrowed = self.result.borrow();
        borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success");
    }

    fn error_matches(&self, check: impl FnOnce(&CliError) -> bool) {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        assert!(check(error), "unexpected error {error:?}");
    }

    fn listed(&self) -> Vec<String> {
        self.run("reminders", &[]).expect("reminders should list");
        let reminders: Vec<Reminder> =
            serde_json::from_slice(&self.stdout.borrow()).expect("output should be reminders");
        reminders
            .into_iter()
            .map(|reminder| reminder.description)
            .collect()
    }
}

#[fixture]
fn world() -> ReminderWorld {
    ReminderWorld::new()
}

#[given("reminders for milk, eggs and milk were added")]
fn reminders_were_added(#[from(world)] world: &ReminderWorld) {
    for item in ["milk", "eggs", "milk"] {
        world.run("remind", &[item]).expect("remind should succeed");
    }
}

#[when("I list the reminders")]
fn list_reminders(#[from(world)] world: &ReminderWorld) {
    world.record("reminders", &[]);
}

#[when("I forget reminders described as milk")]
fn forget_milk(#[from(world)] world: &ReminderWorld) {
    world.record("forget", &["--description", "milk"]);
}

#[when("I forget reminders without a selector")]
fn forget_nothing(#[from(world)] world: &ReminderWorld) {
    world.record("forget", &[]);
}

#[then("the reminders are printed oldest first")]
fn reminders_printed_in_order(#[from(world)] world: &ReminderWorld) {
    world.succeeded();
    let reminders: Vec<Reminder> =
        serde_json::from_slice(&world.stdout.borrow()).expect("output should be reminders");
    let descriptions: Vec<&str> = reminders
        .iter()
        .map(|reminder| reminder.description.as_str())
        .collect();
    assert_eq!(descriptions, ["milk", "eggs", "milk"]);
    assert!(reminders.windows(2).all(|pair| pair[0].id < pair[1].id));
}

#[then("two reminders are reported deleted")]
fn two_reminders_deleted(#[from(world)] world: &ReminderWorld) {
    world.succeeded();
    let report: ForgetReport =
        serde_json::from_slice(&world.stdout.borrow()).expect("output should be a forget report");
    assert_eq!(report, ForgetReport { deleted: 2 });
}

#[then("only the eggs reminder remains")]
fn only_eggs_remain(#[from(world)] world: &ReminderWorld) {
    assert_eq!(world.listed(), ["eggs"]);
}

#[then("the command fails because nothing was selected")]
fn fails_nothing_selected(#[from(world)] world: &ReminderWorld) {
    world.error_matches(|error| matches!(error, CliError::NothingToForget));
}

#[then("the command fails because the database is missing")]
fn fails_missing_database(#[from(world)] world: &ReminderWorld) {
    world.error_matches(|error| matches!(error, CliError::MissingDatabase { .. }));
}

macro_rules! register_reminder_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/reminder_commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: ReminderWorld) {
            let _ = world;
        }
    };
}

register_reminder_scenario!(add_and_list_reminders, "adding and listing reminders");
register_reminder_scenario!(forget_by_description, "forgetting reminders by description");
register_reminder_scenario!(forget_without_selector, "forgetting without a selector");
register_reminder_scenario!(list_before_adding, "listing reminders before any were added");
