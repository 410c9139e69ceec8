//! Settlement model
//!
//! A settlement records one member paying another back outside of any
//! expense. It moves both members' net balances toward zero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{GroupId, MemberId, SettlementId};
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub group_id: GroupId,

    /// Member who paid
    pub from: MemberId,

    /// Member who received the payment
    pub to: MemberId,

    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    pub fn new(
        group_id: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: SettlementId::new(),
            group_id,
            from,
            to,
            amount,
            date,
            note: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.amount.is_positive() {
            return Err(format!("Settlement amount must be positive, got {}", self.amount));
        }
        if self.from == self.to {
            return Err("A member cannot settle with themselves".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} {}",
            self.date.format("%Y-%m-%d"),
            self.from,
            self.to,
            self.amount
        )
    }
}
