//! Expense display formatting
//!
//! Tables for expense lists and detail views for single expenses, including
//! the split check banner shown when shares do not match the amount.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::ledger::split::{display_label, percentage_of};
use crate::ledger::SplitCheck;
use crate::models::{Expense, MemberId};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Paid By")]
    paid_by: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "")]
    note: String,
}

/// Format a list of expenses as a table
///
/// With a `viewer`, the last column describes each expense from that
/// member's point of view ("you lent $20.00"); otherwise it marks recurring
/// templates and generated instances. Amounts and dates follow `settings`.
pub fn format_expense_list(
    expenses: &[Expense],
    viewer: Option<MemberId>,
    settings: &Settings,
) -> String {
    if expenses.is_empty() {
        return "No expenses found.".to_string();
    }
    let symbol = settings.currency_symbol.as_str();

    let rows = expenses.iter().map(|e| ExpenseRow {
        id: e.id.to_string(),
        date: settings.format_date(e.date),
        description: e.description.clone(),
        category: e.category.to_string(),
        paid_by: e.paid_by_name.clone(),
        amount: e.amount.format_with_symbol(symbol),
        note: match viewer {
            Some(member_id) => display_label(e, member_id, symbol),
            None if e.is_recurring() => "recurring".to_string(),
            None if e.is_instance() => "generated".to_string(),
            None => String::new(),
        },
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(5)).with(Alignment::right()));

    let total: crate::models::Money = expenses.iter().map(|e| e.amount).sum();
    format!(
        "{}\n{} expense(s), total {}\n",
        table,
        expenses.len(),
        total.format_with_symbol(symbol)
    )
}

/// Format a single expense with its shares
pub fn format_expense_details(expense: &Expense, settings: &Settings) -> String {
    let symbol = settings.currency_symbol.as_str();
    let mut output = String::new();

    output.push_str(&format!("Expense: {}\n", expense.description));
    output.push_str(&format!("  ID:        {}\n", expense.id));
    output.push_str(&format!("  Date:      {}\n", settings.format_date(expense.date)));
    output.push_str(&format!(
        "  Amount:    {} {}\n",
        expense.amount.format_with_symbol(symbol),
        expense.currency
    ));
    output.push_str(&format!("  Category:  {}\n", expense.category));
    output.push_str(&format!("  Paid by:   {}\n", expense.paid_by_name));

    if let Some(rule) = &expense.recurrence {
        output.push_str(&format!("  Repeats:   {}\n", rule.describe()));
    }
    if let Some(template) = expense.template_id {
        output.push_str(&format!("  Template:  {}\n", template));
    }
    if !expense.skipped_dates.is_empty() {
        let skipped: Vec<String> = expense
            .skipped_dates
            .iter()
            .map(|d| settings.format_date(*d))
            .collect();
        output.push_str(&format!("  Skipped:   {}\n", skipped.join(", ")));
    }
    if !expense.notes.is_empty() {
        output.push_str(&format!("  Notes:     {}\n", expense.notes));
    }

    output.push_str("\n  Shares:\n");
    for split in &expense.splits {
        output.push_str(&format!(
            "    {:<20} {:>12} {:>6.1}%  {}\n",
            split.member_name,
            split.share.format_with_symbol(symbol),
            percentage_of(split.share, expense.amount),
            if split.paid { "paid" } else { "" }
        ));
    }

    if let Some(banner) = format_split_check(&expense.split_check(), symbol) {
        output.push('\n');
        output.push_str(&banner);
        output.push('\n');
    }

    output
}

/// Warning banner for an unbalanced split, `None` when balanced
pub fn format_split_check(check: &SplitCheck, symbol: &str) -> Option<String> {
    check.warning(symbol).map(|w| format!("Warning: {}", w))
}
