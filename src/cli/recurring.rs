//! Recurring expense CLI commands

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::Settings;
use crate::error::SplitResult;
use crate::ledger::look_ahead_bound;
use crate::models::Expense;
use crate::services::{ExpenseService, GroupService};
use crate::storage::Storage;

use super::parse_date;

/// Recurring subcommands
#[derive(Subcommand)]
pub enum RecurringCommands {
    /// Create the pending occurrences of every recurring expense in a group
    Generate {
        /// Group name or ID
        group: String,
        /// Generate occurrences up to this date (defaults to the configured look-ahead)
        #[arg(long)]
        until: Option<String>,
    },
    /// Show the occurrences `generate` would create, without saving them
    Preview {
        /// Group name or ID
        group: String,
        /// Look ahead to this date (defaults to the configured look-ahead)
        #[arg(long)]
        until: Option<String>,
    },
}

/// Handle a recurring command
pub fn handle_recurring_command(
    storage: &Storage,
    settings: &Settings,
    cmd: RecurringCommands,
) -> SplitResult<()> {
    let groups = GroupService::new(storage);
    let service = ExpenseService::new(storage);

    match cmd {
        RecurringCommands::Generate { group, until } => {
            let group = groups.require(&group)?;
            let look_ahead = resolve_look_ahead(until.as_deref(), settings)?;
            let created = service.generate_recurring(group.id, look_ahead)?;

            if created.is_empty() {
                println!(
                    "No new recurring expenses up to {}",
                    settings.format_date(look_ahead)
                );
            } else {
                println!(
                    "Generated {} recurring expense(s) up to {}:",
                    created.len(),
                    settings.format_date(look_ahead)
                );
                print_occurrences(&created, settings);
            }
        }

        RecurringCommands::Preview { group, until } => {
            let group = groups.require(&group)?;
            let look_ahead = resolve_look_ahead(until.as_deref(), settings)?;
            let pending = service.preview_recurring(group.id, look_ahead)?;

            if pending.is_empty() {
                println!("Nothing due up to {}", settings.format_date(look_ahead));
            } else {
                println!(
                    "{} occurrence(s) due up to {}:",
                    pending.len(),
                    settings.format_date(look_ahead)
                );
                print_occurrences(&pending, settings);
            }
        }
    }

    Ok(())
}

fn resolve_look_ahead(until: Option<&str>, settings: &Settings) -> SplitResult<NaiveDate> {
    match until {
        Some(date) => parse_date(date),
        None => Ok(look_ahead_bound(
            Local::now().date_naive(),
            settings.look_ahead_months,
        )),
    }
}

fn print_occurrences(expenses: &[Expense], settings: &Settings) {
    for expense in expenses {
        println!(
            "  {}  {:<30} {:>12}",
            settings.format_date(expense.date),
            expense.description,
            expense.amount.format_with_symbol(&settings.currency_symbol)
        );
    }
}
