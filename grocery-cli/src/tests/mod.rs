//! Shared test harness modules for the grocery CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod helpers;
mod locate_unit;
mod reminder_steps;
