//! Balance and settlement CLI commands

use clap::Args;

use crate::config::Settings;
use crate::display::balance::{format_balances, format_suggestions};
use crate::error::SplitResult;
use crate::services::{GroupService, SettlementService};
use crate::storage::Storage;

use super::{parse_amount, parse_date_or_today, resolve_member};

/// Arguments for `balance`
#[derive(Args)]
pub struct BalanceArgs {
    /// Group name or ID
    pub group: String,
    /// Also suggest payments that would settle everyone up
    #[arg(short, long)]
    pub suggest: bool,
}

/// Arguments for `settle`
#[derive(Args)]
pub struct SettleArgs {
    /// Group name or ID
    pub group: String,
    /// Member who paid
    pub from: String,
    /// Member who received the money
    pub to: String,
    /// Amount paid (e.g., "25.00")
    pub amount: String,
    /// Payment date (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,
    /// Free-form note
    #[arg(short, long)]
    pub note: Option<String>,
}

/// Show net balances for a group
pub fn handle_balance_command(
    storage: &Storage,
    settings: &Settings,
    args: BalanceArgs,
) -> SplitResult<()> {
    let group = GroupService::new(storage).require(&args.group)?;
    let service = SettlementService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    println!("Balances for {}:", group.name);
    print!("{}", format_balances(&service.balances(group.id)?, symbol));

    if args.suggest {
        println!();
        println!(
            "{}",
            format_suggestions(&service.suggest(group.id)?, &group, symbol)
        );
    }

    Ok(())
}

/// Record a payment between two members
pub fn handle_settle_command(
    storage: &Storage,
    settings: &Settings,
    args: SettleArgs,
) -> SplitResult<()> {
    let group = GroupService::new(storage).require(&args.group)?;
    let from = resolve_member(&group, &args.from)?;
    let to = resolve_member(&group, &args.to)?;
    let amount = parse_amount(&args.amount)?;
    let date = parse_date_or_today(args.date.as_deref())?;

    let settlement =
        SettlementService::new(storage).record(group.id, from.id, to.id, amount, date, args.note)?;

    println!(
        "Recorded: {} paid {} {} on {}",
        from.name,
        to.name,
        settlement
            .amount
            .format_with_symbol(&settings.currency_symbol),
        settings.format_date(settlement.date)
    );

    Ok(())
}
