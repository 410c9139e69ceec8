//! Balance display formatting

use crate::ledger::{MemberBalance, SuggestedTransfer};
use crate::models::{Group, MemberId, Money};

/// Format each member's net balance
///
/// Positive balances read "is owed", negative ones "owes".
pub fn format_balances(balances: &[MemberBalance], symbol: &str) -> String {
    if balances.is_empty() {
        return "No members in this group.".to_string();
    }

    let name_width = balances
        .iter()
        .map(|b| b.member_name.len())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut output = String::new();
    for balance in balances {
        let status = if balance.is_owed() {
            format!("is owed {}", balance.net.format_with_symbol(symbol))
        } else if balance.owes() {
            format!("owes {}", balance.net.abs().format_with_symbol(symbol))
        } else {
            "settled up".to_string()
        };

        output.push_str(&format!(
            "{:<name_width$}  {:>12}  {}\n",
            balance.member_name,
            balance.net.format_with_symbol(symbol),
            status,
            name_width = name_width,
        ));
    }

    let outstanding: Money = balances.iter().filter(|b| b.is_owed()).map(|b| b.net).sum();
    if outstanding.is_zero() {
        output.push_str("\nEveryone is settled up.\n");
    } else {
        output.push_str(&format!(
            "\nOutstanding: {}\n",
            outstanding.format_with_symbol(symbol)
        ));
    }

    output
}

/// Format suggested transfers using the group's member names
pub fn format_suggestions(transfers: &[SuggestedTransfer], group: &Group, symbol: &str) -> String {
    if transfers.is_empty() {
        return "Nothing to settle.".to_string();
    }

    let name = |id: MemberId| {
        group
            .member(id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let mut output = String::from("Suggested payments:\n");
    for transfer in transfers {
        output.push_str(&format!(
            "  {} pays {} {}\n",
            name(transfer.from),
            name(transfer.to),
            transfer.amount.format_with_symbol(symbol)
        ));
    }
    output
}
