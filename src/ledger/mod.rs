//! Pure calculations over groups and expenses
//!
//! - `split`: share validation, percentages, equal splits, payer roles
//! - `recurrence`: occurrence dates and materialized recurring instances
//! - `balance`: net balance per member and settle-up suggestions
//!
//! Nothing here performs I/O or keeps state between calls. Malformed input
//! degrades to a safe value (a failed [`SplitCheck`], a zero percentage, a
//! clamped interval, an empty result) instead of an error.

pub mod balance;
pub mod recurrence;
pub mod split;

pub use balance::{
    compute_balances, compute_balances_with_settlements, member_balances, suggest_settlements,
    MemberBalance, SuggestedTransfer,
};
pub use recurrence::{
    look_ahead_bound, materialize, occurrences, pending_instances, MAX_OCCURRENCES,
};
pub use split::{
    equal_split, percentage_of, role_of, validate_split, SplitCheck, SplitRole, SplitStatus,
};
