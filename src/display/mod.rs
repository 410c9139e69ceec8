//! Display formatting for terminal output
//!
//! Turns groups, expenses and balances into tables and detail views.

pub mod balance;
pub mod expense;
pub mod group;

pub use balance::{format_balances, format_suggestions};
pub use expense::{format_expense_details, format_expense_list, format_split_check};
pub use group::{format_group_details, format_group_list};
