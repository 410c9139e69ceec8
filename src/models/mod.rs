//! Core data models for split-ledger
//!
//! Groups, members, expenses with their splits, recurrence rules and
//! settlements. These are plain value types; the calculations over them live
//! in `ledger`.

pub mod expense;
pub mod group;
pub mod ids;
pub mod money;
pub mod recurrence;
pub mod settlement;

pub use expense::{Expense, ExpenseCategory, ExpenseSplit, ExpenseValidationError};
pub use group::{Group, GroupValidationError, Member, MemberRole};
pub use ids::{ExpenseId, GroupId, MemberId, SettlementId};
pub use money::{is_valid_currency_code, Money, MoneyParseError};
pub use recurrence::{Frequency, RecurrenceRule};
pub use settlement::Settlement;
