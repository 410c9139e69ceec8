//! Split ledger calculator
//!
//! Checks that the shares of an expense cover its amount, computes each
//! share as a percentage, builds equal splits, and works out how an expense
//! should be labelled from a given member's point of view.

use crate::models::{Expense, ExpenseSplit, Member, MemberId, Money};

/// Shares may differ from the total by strictly less than this and still count as balanced
pub const SPLIT_TOLERANCE: Money = Money::from_cents(1);

/// Result of comparing an expense amount with the sum of its shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitCheck {
    pub is_valid: bool,

    /// `total - sum(shares)`: positive when under-allocated, negative when over-allocated
    pub difference: Money,
}

/// Classification of a [`SplitCheck`] for warning banners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStatus {
    Balanced,
    UnderAllocated(Money),
    OverAllocated(Money),
}

impl SplitCheck {
    pub fn status(&self) -> SplitStatus {
        if self.is_valid {
            SplitStatus::Balanced
        } else if self.difference.is_positive() {
            SplitStatus::UnderAllocated(self.difference)
        } else {
            SplitStatus::OverAllocated(self.difference.abs())
        }
    }

    /// Message to show the user, or `None` when the split is balanced
    pub fn warning(&self, symbol: &str) -> Option<String> {
        match self.status() {
            SplitStatus::Balanced => None,
            SplitStatus::UnderAllocated(missing) => Some(format!(
                "Shares are {} short of the expense total",
                missing.format_with_symbol(symbol)
            )),
            SplitStatus::OverAllocated(extra) => Some(format!(
                "Shares exceed the expense total by {}",
                extra.format_with_symbol(symbol)
            )),
        }
    }
}

/// Compare `total` with the sum of the shares
///
/// An empty split list sums to zero, so it is only valid for a zero total.
pub fn validate_split(total: Money, splits: &[ExpenseSplit]) -> SplitCheck {
    let allocated: Money = splits.iter().map(|s| s.share).sum();
    let difference = total - allocated;
    SplitCheck {
        is_valid: difference.abs() < SPLIT_TOLERANCE,
        difference,
    }
}

/// `share / total * 100`, or 0 when the total is zero
pub fn percentage_of(share: Money, total: Money) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    share.cents() as f64 / total.cents() as f64 * 100.0
}

/// Split `total` equally among `participants`
///
/// Leftover cents go to the first participants in order. The payer's split
/// is marked as paid.
pub fn equal_split(total: Money, participants: &[Member], payer: MemberId) -> Vec<ExpenseSplit> {
    participants
        .iter()
        .zip(total.split_evenly(participants.len()))
        .map(|(member, share)| ExpenseSplit {
            member_id: member.id,
            member_name: member.name.clone(),
            share,
            paid: member.id == payer,
        })
        .collect()
}

/// How a member relates to an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRole {
    Payer,
    Participant,
    NotInvolved,
}

pub fn role_of(expense: &Expense, member_id: MemberId) -> SplitRole {
    if expense.paid_by == member_id {
        SplitRole::Payer
    } else if expense.share_of(member_id).is_some() {
        SplitRole::Participant
    } else {
        SplitRole::NotInvolved
    }
}

/// Short label describing the expense from `member_id`'s point of view
pub fn display_label(expense: &Expense, member_id: MemberId, symbol: &str) -> String {
    match role_of(expense, member_id) {
        SplitRole::Payer => {
            let own = expense.share_of(member_id).unwrap_or_default();
            let lent = expense.amount - own;
            if lent.is_zero() {
                format!("you paid {}", expense.amount.format_with_symbol(symbol))
            } else {
                format!("you lent {}", lent.format_with_symbol(symbol))
            }
        }
        SplitRole::Participant => {
            let share = expense.share_of(member_id).unwrap_or_default();
            let paid = expense
                .splits
                .iter()
                .any(|s| s.member_id == member_id && s.paid);
            if paid {
                format!("you paid back {}", share.format_with_symbol(symbol))
            } else {
                format!("you owe {}", share.format_with_symbol(symbol))
            }
        }
        SplitRole::NotInvolved => "not involved".to_string(),
    }
}
