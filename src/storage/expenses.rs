//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses to expenses.json, with an in-memory
//! index from group to expense IDs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SplitError;
use crate::models::{Expense, ExpenseId, GroupId};

use super::file_io::{read_json, write_json_atomic};
use super::{poisoned, ExpenseStore};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Repository for expense persistence with a per-group index
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    by_group: RwLock<HashMap<GroupId, Vec<ExpenseId>>>,
}

/// Newest first; ties broken by creation time so the order is stable
fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

impl ExpenseRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_group: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenses from disk and rebuild the index
    pub fn load(&self) -> Result<(), SplitError> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(poisoned)?;
        let mut by_group = self.by_group.write().map_err(poisoned)?;

        data.clear();
        by_group.clear();

        for expense in file_data.expenses {
            by_group.entry(expense.group_id).or_default().push(expense.id);
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), SplitError> {
        let data = self.data.read().map_err(poisoned)?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut expenses);

        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(&id).cloned())
    }

    pub fn get_all(&self) -> Result<Vec<Expense>, SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        let mut expenses: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut expenses);
        Ok(expenses)
    }

    /// Expenses of one group, newest first
    pub fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Expense>, SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        let by_group = self.by_group.read().map_err(poisoned)?;

        let ids = by_group.get(&group_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut expenses: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        sort_newest_first(&mut expenses);
        Ok(expenses)
    }

    /// Instances generated from a recurring template
    pub fn get_instances(&self, template_id: ExpenseId) -> Result<Vec<Expense>, SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        let mut instances: Vec<_> = data
            .values()
            .filter(|e| e.template_id == Some(template_id))
            .cloned()
            .collect();
        instances.sort_by_key(|e| e.date);
        Ok(instances)
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), SplitError> {
        let mut data = self.data.write().map_err(poisoned)?;
        let mut by_group = self.by_group.write().map_err(poisoned)?;

        if let Some(old) = data.get(&expense.id) {
            if let Some(ids) = by_group.get_mut(&old.group_id) {
                ids.retain(|&id| id != expense.id);
            }
        }

        by_group.entry(expense.group_id).or_default().push(expense.id);
        data.insert(expense.id, expense);

        Ok(())
    }

    /// Delete an expense, returning whether it existed
    pub fn delete(&self, id: ExpenseId) -> Result<bool, SplitError> {
        let mut data = self.data.write().map_err(poisoned)?;
        let mut by_group = self.by_group.write().map_err(poisoned)?;

        match data.remove(&id) {
            Some(expense) => {
                if let Some(ids) = by_group.get_mut(&expense.group_id) {
                    ids.retain(|&eid| eid != id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete every expense of a group, returning how many were removed
    pub fn delete_by_group(&self, group_id: GroupId) -> Result<usize, SplitError> {
        let mut data = self.data.write().map_err(poisoned)?;
        let mut by_group = self.by_group.write().map_err(poisoned)?;

        let ids = by_group.remove(&group_id).unwrap_or_default();
        Ok(ids.iter().filter(|id| data.remove(*id).is_some()).count())
    }

    pub fn count(&self) -> Result<usize, SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.len())
    }
}

impl ExpenseStore for ExpenseRepository {
    fn fetch_expenses(&self, group_id: GroupId) -> Result<Vec<Expense>, SplitError> {
        self.get_by_group(group_id)
    }

    fn save(&self, expense: Expense) -> Result<(), SplitError> {
        self.upsert(expense)?;
        ExpenseRepository::save(self)
    }

    /// Upserts every expense, then writes the file once
    fn save_all(&self, expenses: Vec<Expense>) -> Result<(), SplitError> {
        if expenses.is_empty() {
            return Ok(());
        }
        for expense in expenses {
            self.upsert(expense)?;
        }
        ExpenseRepository::save(self)
    }

    fn delete(&self, id: ExpenseId) -> Result<bool, SplitError> {
        let removed = ExpenseRepository::delete(self, id)?;
        if removed {
            ExpenseRepository::save(self)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberId, Money, RecurrenceRule};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ExpenseRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        (temp_dir, repo)
    }

    fn expense(group_id: GroupId, day: u32, cents: i64) -> Expense {
        Expense::new(
            group_id,
            "Lunch",
            Money::from_cents(cents),
            "USD",
            MemberId::new(),
            "Alice",
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_get_by_group_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        let g1 = GroupId::new();
        let g2 = GroupId::new();

        repo.upsert(expense(g1, 5, 100)).unwrap();
        repo.upsert(expense(g1, 20, 200)).unwrap();
        repo.upsert(expense(g2, 10, 300)).unwrap();

        let g1_expenses = repo.get_by_group(g1).unwrap();
        assert_eq!(g1_expenses.len(), 2);
        assert_eq!(g1_expenses[0].amount.cents(), 200);
        assert_eq!(repo.get_by_group(g2).unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_moves_between_groups() {
        let (_temp_dir, repo) = create_test_repo();
        let g1 = GroupId::new();
        let g2 = GroupId::new();

        let mut e = expense(g1, 1, 100);
        repo.upsert(e.clone()).unwrap();
        e.group_id = g2;
        repo.upsert(e).unwrap();

        assert!(repo.get_by_group(g1).unwrap().is_empty());
        assert_eq!(repo.get_by_group(g2).unwrap().len(), 1);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let group = GroupId::new();
        let e = expense(group, 15, 5000).with_recurrence(RecurrenceRule::monthly());
        let id = e.id;

        repo.upsert(e).unwrap();
        repo.save().unwrap();

        let repo2 = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        repo2.load().unwrap();
        let loaded = repo2.get(id).unwrap().unwrap();
        assert_eq!(loaded.amount.cents(), 5000);
        assert_eq!(loaded.recurrence, Some(RecurrenceRule::monthly()));
        assert_eq!(repo2.get_by_group(group).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_and_delete_by_group() {
        let (_temp_dir, repo) = create_test_repo();
        let group = GroupId::new();
        let first = expense(group, 1, 100);
        let first_id = first.id;
        repo.upsert(first).unwrap();
        repo.upsert(expense(group, 2, 200)).unwrap();
        repo.upsert(expense(group, 3, 300)).unwrap();

        assert!(repo.delete(first_id).unwrap());
        assert!(!repo.delete(first_id).unwrap());
        assert_eq!(repo.delete_by_group(group).unwrap(), 2);
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_get_instances() {
        let (_temp_dir, repo) = create_test_repo();
        let group = GroupId::new();
        let template = expense(group, 1, 100);
        let mut later = expense(group, 20, 100);
        later.template_id = Some(template.id);
        let mut earlier = expense(group, 10, 100);
        earlier.template_id = Some(template.id);

        repo.upsert(template.clone()).unwrap();
        repo.upsert(later).unwrap();
        repo.upsert(earlier).unwrap();

        let instances = repo.get_instances(template.id).unwrap();
        assert_eq!(instances.len(), 2);
        assert!(instances[0].date < instances[1].date);
    }

    #[test]
    fn test_expense_store_persists_immediately() {
        let (temp_dir, repo) = create_test_repo();
        let group = GroupId::new();
        let e = expense(group, 1, 100);
        let id = e.id;

        let store: &dyn ExpenseStore = &repo;
        store.save(e).unwrap();
        assert_eq!(store.fetch_expenses(group).unwrap().len(), 1);

        let reloaded = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);

        assert!(store.delete(id).unwrap());
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 0);
    }

    #[test]
    fn test_expense_store_save_all_persists_batch() {
        let (temp_dir, repo) = create_test_repo();
        let group = GroupId::new();
        let batch: Vec<_> = (1..=20).map(|day| expense(group, day, 100)).collect();

        let store: &dyn ExpenseStore = &repo;
        store.save_all(batch).unwrap();
        store.save_all(Vec::new()).unwrap();

        let reloaded = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_by_group(group).unwrap().len(), 20);
    }
}
