//! Audit logging for split-ledger
//!
//! Every create, update and delete of a group, expense or settlement is
//! appended to `audit.log` as one JSON object per line (JSONL), with the
//! entity's state before and after the change.
//!
//! # Example
//!
//! ```rust,ignore
//! use split_ledger::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! let entry = AuditEntry::create(
//!     EntityType::Expense,
//!     expense.id.to_string(),
//!     Some(expense.description.clone()),
//!     &expense,
//! );
//! logger.log(&entry)?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
