//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod balance;
pub mod expense;
pub mod export;
pub mod group;
pub mod recurring;
pub mod report;

pub use balance::{handle_balance_command, handle_settle_command, BalanceArgs, SettleArgs};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportArgs};
pub use group::{handle_group_command, GroupCommands};
pub use recurring::{handle_recurring_command, RecurringCommands};
pub use report::{handle_report_command, ReportArgs};

use chrono::{Local, NaiveDate};

use crate::config::Settings;
use crate::error::{SplitError, SplitResult};
use crate::models::{Group, Member, MemberId, Money};

/// Parse a user-entered amount such as `12.50`, `$12.50` or `12`
pub(crate) fn parse_amount(input: &str) -> SplitResult<Money> {
    Money::parse(input).map_err(|e| {
        SplitError::Validation(format!(
            "Invalid amount '{}': {}. Use a format like '12.50' or '12'",
            input, e
        ))
    })
}

/// Parse a `YYYY-MM-DD` date, defaulting to today when absent
pub(crate) fn parse_date_or_today(input: Option<&str>) -> SplitResult<NaiveDate> {
    match input {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}

pub(crate) fn parse_date(input: &str) -> SplitResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        SplitError::Validation(format!(
            "Invalid date '{}'. Use the format YYYY-MM-DD",
            input
        ))
    })
}

/// Find a member of `group` by name or ID
pub(crate) fn resolve_member<'g>(group: &'g Group, identifier: &str) -> SplitResult<&'g Member> {
    group
        .find_member(identifier)
        .ok_or_else(|| SplitError::member_not_found(identifier))
}

/// The configured current user, if they belong to `group`
pub(crate) fn current_member(group: &Group, settings: &Settings) -> Option<MemberId> {
    settings
        .current_user
        .as_deref()
        .and_then(|name| group.member_by_name(name))
        .map(|m| m.id)
}
