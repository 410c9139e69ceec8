//! Service layer for split-ledger
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, cross-entity checks and audit logging. The
//! calculations themselves live in `ledger`; services fetch the data and pass
//! it in.

pub mod expense;
pub mod group;
pub mod settlement;

pub use expense::{
    generate_recurring_instances, CreateExpenseInput, ExpenseFilter, ExpenseService, SavedExpense,
    SplitMode, UpdateExpenseInput,
};
pub use group::{GroupDeletion, GroupService};
pub use settlement::SettlementService;
