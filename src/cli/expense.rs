//! Expense CLI commands
//!
//! Implements CLI commands for adding, listing, editing and removing expenses.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::expense::{format_expense_details, format_expense_list, format_split_check};
use crate::error::{SplitError, SplitResult};
use crate::models::{ExpenseCategory, Frequency, Group, RecurrenceRule};
use crate::services::{
    CreateExpenseInput, ExpenseFilter, ExpenseService, GroupService, SavedExpense, SplitMode,
    UpdateExpenseInput,
};
use crate::storage::Storage;

use super::{current_member, parse_amount, parse_date, parse_date_or_today, resolve_member};

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Add an expense to a group
    Add {
        /// Group name or ID
        group: String,
        /// What the money was spent on
        description: String,
        /// Amount (e.g., "42.50")
        amount: String,
        /// Member who paid (defaults to the current user)
        #[arg(short, long)]
        paid_by: Option<String>,
        /// Expense date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Category (food, transport, accommodation, entertainment, shopping, utilities, health, travel, other)
        #[arg(short, long, default_value = "other")]
        category: String,
        /// Split equally among these members only (comma-separated)
        #[arg(long, value_delimiter = ',', conflicts_with = "share")]
        among: Vec<String>,
        /// Explicit share for a member, as NAME=AMOUNT (repeatable)
        #[arg(long)]
        share: Vec<String>,
        /// Repeat the expense (daily, weekly, monthly, yearly)
        #[arg(long)]
        repeat: Option<String>,
        /// Repeat every N periods (default 1)
        #[arg(long, requires = "repeat")]
        every: Option<i32>,
        /// Last date a repetition may fall on (YYYY-MM-DD)
        #[arg(long, requires = "repeat")]
        until: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List the expenses of a group
    List {
        /// Group name or ID
        group: String,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Earliest date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Latest date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Only expenses this member paid for or shares in
        #[arg(short, long)]
        member: Option<String>,
        /// Only recurring templates
        #[arg(long)]
        recurring: bool,
        /// Number of expenses to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    /// Show an expense with its shares
    Show {
        /// Expense ID
        expense: String,
    },
    /// Change an existing expense
    Edit {
        /// Expense ID
        expense: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Re-split equally among all group members
        #[arg(long)]
        resplit: bool,
    },
    /// Delete an expense (a recurring template takes its instances with it)
    Delete {
        /// Expense ID
        expense: String,
    },
    /// Check whether an expense's shares add up to its amount
    Check {
        /// Expense ID
        expense: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> SplitResult<()> {
    let groups = GroupService::new(storage);
    let service = ExpenseService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            group,
            description,
            amount,
            paid_by,
            date,
            category,
            among,
            share,
            repeat,
            every,
            until,
            notes,
        } => {
            let group = groups.require(&group)?;
            let amount = parse_amount(&amount)?;

            let payer = match paid_by.as_deref() {
                Some(name) => resolve_member(&group, name)?.id,
                None => current_member(&group, settings).ok_or_else(|| {
                    SplitError::Validation(
                        "No payer given. Use --paid-by or set a current user with `splitledger config --user`"
                            .into(),
                    )
                })?,
            };

            let split = parse_split_mode(&group, &among, &share)?;

            let recurrence = match repeat {
                Some(freq) => {
                    let frequency: Frequency = freq.parse().map_err(SplitError::Validation)?;
                    let mut rule = RecurrenceRule::new(frequency, every.unwrap_or(1));
                    if let Some(until) = until.as_deref() {
                        rule = rule.until(parse_date(until)?);
                    }
                    Some(rule)
                }
                None => None,
            };

            let saved = service.create(CreateExpenseInput {
                group_id: group.id,
                description,
                amount,
                paid_by: payer,
                date: parse_date_or_today(date.as_deref())?,
                category: parse_category(&category)?,
                notes,
                split,
                recurrence,
            })?;

            print_saved("Added", &saved, settings);
        }

        ExpenseCommands::List {
            group,
            category,
            from,
            to,
            member,
            recurring,
            limit,
        } => {
            let group = groups.require(&group)?;

            let mut filter = ExpenseFilter::new().limit(limit);
            if let Some(category) = category.as_deref() {
                filter = filter.category(parse_category(category)?);
            }
            if let Some(from) = from.as_deref() {
                filter = filter.since(parse_date(from)?);
            }
            if let Some(to) = to.as_deref() {
                filter = filter.until(parse_date(to)?);
            }
            if let Some(member) = member.as_deref() {
                filter = filter.member(resolve_member(&group, member)?.id);
            }
            if recurring {
                filter = filter.recurring_only();
            }

            let expenses = service.list(group.id, &filter)?;
            let viewer = current_member(&group, settings);
            print!("{}", format_expense_list(&expenses, viewer, settings));
        }

        ExpenseCommands::Show { expense } => {
            let found = service.require(&expense)?;
            print!("{}", format_expense_details(&found, settings));
        }

        ExpenseCommands::Edit {
            expense,
            description,
            amount,
            date,
            category,
            notes,
            resplit,
        } => {
            let found = service.require(&expense)?;
            let input = UpdateExpenseInput {
                description,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                date: date.as_deref().map(parse_date).transpose()?,
                category: category.as_deref().map(parse_category).transpose()?,
                notes,
                split: resplit.then(SplitMode::default),
            };

            let saved = service.update(found.id, input)?;
            print_saved("Updated", &saved, settings);
        }

        ExpenseCommands::Delete { expense } => {
            let found = service.require(&expense)?;
            let removed = service.delete(found.id)?;
            println!("Deleted expense: {}", found);
            if removed.len() > 1 {
                println!("  Also deleted {} generated instance(s)", removed.len() - 1);
            }
        }

        ExpenseCommands::Check { expense } => {
            let found = service.require(&expense)?;
            let check = found.split_check();
            match format_split_check(&check, symbol) {
                Some(banner) => println!("{}", banner),
                None => println!(
                    "Shares of '{}' add up to {}",
                    found.description,
                    found.amount.format_with_symbol(symbol)
                ),
            }
        }
    }

    Ok(())
}

fn parse_category(input: &str) -> SplitResult<ExpenseCategory> {
    input.parse().map_err(SplitError::Validation)
}

/// Build a split mode from `--among` names or `--share NAME=AMOUNT` pairs
fn parse_split_mode(group: &Group, among: &[String], shares: &[String]) -> SplitResult<SplitMode> {
    if !shares.is_empty() {
        let exact = shares
            .iter()
            .map(|entry| {
                let (name, amount) = entry.split_once('=').ok_or_else(|| {
                    SplitError::Validation(format!(
                        "Invalid share '{}'. Use the form NAME=AMOUNT",
                        entry
                    ))
                })?;
                Ok((resolve_member(group, name)?.id, parse_amount(amount)?))
            })
            .collect::<SplitResult<Vec<_>>>()?;
        return Ok(SplitMode::Exact(exact));
    }

    let ids = among
        .iter()
        .filter(|name| !name.trim().is_empty())
        .map(|name| resolve_member(group, name).map(|m| m.id))
        .collect::<SplitResult<Vec<_>>>()?;
    Ok(SplitMode::Equal(ids))
}

fn print_saved(verb: &str, saved: &SavedExpense, settings: &Settings) {
    let symbol = settings.currency_symbol.as_str();
    let expense = &saved.expense;
    println!("{} expense: {}", verb, expense.description);
    println!("  Amount: {}", expense.amount.format_with_symbol(symbol));
    println!("  Paid by: {}", expense.paid_by_name);
    println!("  Date: {}", settings.format_date(expense.date));
    if let Some(rule) = &expense.recurrence {
        println!("  Repeats: {}", rule.describe());
    }
    println!("  ID: {}", expense.id);
    if let Some(banner) = format_split_check(&saved.check, symbol) {
        println!("{}", banner);
    }
}
