//! Reports module for split-ledger
//!
//! Spending analysis per category and per member for a group.

pub mod spending;

pub use spending::{SpendingByCategory, SpendingByMember, SpendingReport};
