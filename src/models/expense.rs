//! Expense model
//!
//! An expense is paid by one group member and shared among participants
//! through a list of splits. Expenses may carry a recurrence rule (templates)
//! or point back to the template they were materialized from (instances).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::ids::{ExpenseId, GroupId, MemberId};
use super::money::{is_valid_currency_code, Money};
use super::recurrence::RecurrenceRule;
use crate::ledger::split::{self, SplitCheck};

/// Category tag for an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Accommodation,
    Entertainment,
    Shopping,
    Utilities,
    Health,
    Travel,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        Self::Food,
        Self::Transport,
        Self::Accommodation,
        Self::Entertainment,
        Self::Shopping,
        Self::Utilities,
        Self::Health,
        Self::Travel,
        Self::Other,
    ];
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Accommodation => "Accommodation",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Utilities => "Utilities",
            Self::Health => "Health",
            Self::Travel => "Travel",
            Self::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.to_string().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown category '{}'", wanted))
    }
}

/// One member's share of an expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub member_id: MemberId,

    /// Display name captured when the split was made
    #[serde(default)]
    pub member_name: String,

    pub share: Money,

    /// Whether this member has already paid their share
    #[serde(default)]
    pub paid: bool,
}

impl ExpenseSplit {
    pub fn new(member_id: MemberId, member_name: impl Into<String>, share: Money) -> Self {
        Self {
            member_id,
            member_name: member_name.into(),
            share,
            paid: false,
        }
    }
}

/// A shared expense within a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub description: String,
    pub amount: Money,
    pub currency: String,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub paid_by: MemberId,
    #[serde(default)]
    pub paid_by_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,

    /// Set on templates that repeat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,

    #[serde(default)]
    pub splits: Vec<ExpenseSplit>,

    /// The template this instance was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<ExpenseId>,

    /// Occurrence dates of a template whose instances were deleted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_dates: Vec<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        group_id: GroupId,
        description: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
        paid_by: MemberId,
        paid_by_name: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            group_id,
            description: description.into(),
            amount,
            currency: currency.into(),
            category: ExpenseCategory::default(),
            paid_by,
            paid_by_name: paid_by_name.into(),
            date,
            notes: String::new(),
            recurrence: None,
            splits: Vec::new(),
            template_id: None,
            skipped_dates: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_splits(mut self, splits: Vec<ExpenseSplit>) -> Self {
        self.splits = splits;
        self
    }

    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }

    /// Sum of all shares
    pub fn splits_total(&self) -> Money {
        self.splits.iter().map(|s| s.share).sum()
    }

    /// Compare the shares against the expense amount
    pub fn split_check(&self) -> SplitCheck {
        split::validate_split(self.amount, &self.splits)
    }

    /// Whether this expense is a recurring template
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Whether this expense was generated from a recurring template
    pub fn is_instance(&self) -> bool {
        self.template_id.is_some()
    }

    /// Remember that the occurrence on `date` was deleted so it is not generated again
    pub fn skip_occurrence(&mut self, date: NaiveDate) {
        if !self.is_skipped(date) {
            self.skipped_dates.push(date);
            self.skipped_dates.sort();
        }
    }

    pub fn is_skipped(&self, date: NaiveDate) -> bool {
        self.skipped_dates.contains(&date)
    }

    pub fn share_of(&self, member_id: MemberId) -> Option<Money> {
        self.splits
            .iter()
            .find(|s| s.member_id == member_id)
            .map(|s| s.share)
    }

    /// Whether the member paid for or takes part in this expense
    pub fn involves(&self, member_id: MemberId) -> bool {
        self.paid_by == member_id || self.splits.iter().any(|s| s.member_id == member_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Structural validation
    ///
    /// A split total that differs from the amount is NOT an error here; that is
    /// reported through [`Expense::split_check`] so it can be shown as a warning.
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.description.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyDescription);
        }
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }
        if !is_valid_currency_code(&self.currency) {
            return Err(ExpenseValidationError::InvalidCurrency(self.currency.clone()));
        }

        let mut seen = HashSet::new();
        for split in &self.splits {
            if split.share.is_negative() {
                return Err(ExpenseValidationError::NegativeShare(
                    split.member_name.clone(),
                ));
            }
            if !seen.insert(split.member_id) {
                return Err(ExpenseValidationError::DuplicateMember(
                    split.member_name.clone(),
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}

/// Structural validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpenseValidationError {
    #[error("Expense description cannot be empty")]
    EmptyDescription,

    #[error("Expense amount must be positive, got {0}")]
    NonPositiveAmount(Money),

    #[error("Invalid currency code '{0}'")]
    InvalidCurrency(String),

    #[error("Share for '{0}' cannot be negative")]
    NegativeShare(String),

    #[error("'{0}' appears more than once in the split")]
    DuplicateMember(String),
}
