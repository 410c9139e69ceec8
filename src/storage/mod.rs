//! Storage layer for split-ledger
//!
//! JSON file storage with atomic writes and automatic directory creation.
//! Each repository keeps its data in memory behind an `RwLock` and writes
//! the whole file on `save`.

pub mod expenses;
pub mod file_io;
pub mod groups;
pub mod settlements;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use groups::GroupRepository;
pub use settlements::SettlementRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::LedgerPaths;
use crate::error::SplitError;
use crate::models::{Expense, ExpenseId, GroupId};

/// Access to the expenses of a group
///
/// The balance and recurrence calculations only need this much, which keeps
/// them testable without the file-backed repository.
pub trait ExpenseStore {
    /// All expenses of a group, newest first
    fn fetch_expenses(&self, group_id: GroupId) -> Result<Vec<Expense>, SplitError>;

    /// Insert or replace an expense and persist it
    fn save(&self, expense: Expense) -> Result<(), SplitError>;

    /// Insert or replace several expenses and persist them together
    fn save_all(&self, expenses: Vec<Expense>) -> Result<(), SplitError> {
        expenses.into_iter().try_for_each(|e| self.save(e))
    }

    /// Remove an expense; `Ok(false)` if it did not exist
    fn delete(&self, id: ExpenseId) -> Result<bool, SplitError>;
}

pub(crate) fn poisoned<T>(e: std::sync::PoisonError<T>) -> SplitError {
    SplitError::Storage(format!("Lock poisoned: {}", e))
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub groups: GroupRepository,
    pub expenses: ExpenseRepository,
    pub settlements: SettlementRepository,
    audit: AuditLogger,
}

impl Storage {
    pub fn new(paths: LedgerPaths) -> Result<Self, SplitError> {
        paths.ensure_directories()?;

        Ok(Self {
            groups: GroupRepository::new(paths.groups_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            settlements: SettlementRepository::new(paths.settlements_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), SplitError> {
        self.groups.load()?;
        self.expenses.load()?;
        self.settlements.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), SplitError> {
        self.groups.save()?;
        self.expenses.save()?;
        self.settlements.save()?;
        Ok(())
    }

    /// Whether `init` has been run (the settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), SplitError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), SplitError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), SplitError> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}
