//! Expense service
//!
//! Provides business logic for expenses: creation with split checking,
//! filtering, updates, cascading deletion of recurring templates, and
//! materialization of recurring instances.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{SplitError, SplitResult};
use crate::ledger::{equal_split, pending_instances, SplitCheck, MAX_OCCURRENCES};
use crate::models::{
    Expense, ExpenseCategory, ExpenseId, ExpenseSplit, Group, GroupId, MemberId, Money,
    RecurrenceRule,
};
use crate::storage::{ExpenseStore, Storage};

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

/// How an expense is divided between members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// Equal shares among the given members, or all group members if empty
    Equal(Vec<MemberId>),
    /// Explicit share per member
    Exact(Vec<(MemberId, Money)>),
}

impl Default for SplitMode {
    fn default() -> Self {
        SplitMode::Equal(Vec::new())
    }
}

/// Input for creating a new expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub group_id: GroupId,
    pub description: String,
    pub amount: Money,
    pub paid_by: MemberId,
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub notes: Option<String>,
    pub split: SplitMode,
    pub recurrence: Option<RecurrenceRule>,
}

/// Changes to apply to an existing expense; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
    pub notes: Option<String>,
    pub split: Option<SplitMode>,
}

/// An expense as saved, with the result of comparing its shares to its amount
#[derive(Debug, Clone)]
pub struct SavedExpense {
    pub expense: Expense,
    pub check: SplitCheck,
}

/// Options for filtering expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<ExpenseCategory>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Only expenses the member paid for or takes part in
    pub member_id: Option<MemberId>,
    /// Only recurring templates
    pub recurring_only: bool,
    pub limit: Option<usize>,
}

impl ExpenseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: ExpenseCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn since(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn member(mut self, member_id: MemberId) -> Self {
        self.member_id = Some(member_id);
        self
    }

    pub fn recurring_only(mut self) -> Self {
        self.recurring_only = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, expense: &Expense) -> bool {
        self.category.map_or(true, |c| expense.category == c)
            && self.start_date.map_or(true, |d| expense.date >= d)
            && self.end_date.map_or(true, |d| expense.date <= d)
            && self.member_id.map_or(true, |m| expense.involves(m))
            && (!self.recurring_only || expense.is_recurring())
    }
}

/// Persist the pending instances of every recurring template in a group
///
/// Instances already present and deleted occurrences are skipped, so calling
/// this repeatedly with the same look-ahead date adds nothing new. A template
/// with more than [`MAX_OCCURRENCES`] missing dates is filled in over several
/// calls. Returns the instances created.
pub fn generate_recurring_instances<S: ExpenseStore + ?Sized>(
    store: &S,
    group_id: GroupId,
    look_ahead: NaiveDate,
) -> SplitResult<Vec<Expense>> {
    let mut created = collect_pending(&store.fetch_expenses(group_id)?, look_ahead);
    store.save_all(created.clone())?;

    created.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(created)
}

fn collect_pending(expenses: &[Expense], look_ahead: NaiveDate) -> Vec<Expense> {
    let mut pending = Vec::new();
    for template in expenses.iter().filter(|e| e.is_recurring()) {
        let instances = pending_instances(template, expenses, look_ahead);
        if instances.len() == MAX_OCCURRENCES {
            warn!(
                template = %template.id,
                limit = MAX_OCCURRENCES,
                "recurring expense has more occurrences due; run generation again"
            );
        }
        pending.extend(instances);
    }
    pending
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new expense
    ///
    /// Shares that do not add up to the amount are accepted; the returned
    /// [`SplitCheck`] reports the difference so callers can warn.
    pub fn create(&self, input: CreateExpenseInput) -> SplitResult<SavedExpense> {
        let group = self.load_group(input.group_id)?;

        let payer = group
            .member(input.paid_by)
            .ok_or_else(|| SplitError::member_not_found(input.paid_by.to_string()))?;

        let splits = build_splits(&group, input.amount, input.paid_by, &input.split)?;

        let mut expense = Expense::new(
            group.id,
            input.description.trim(),
            input.amount,
            group.currency.clone(),
            payer.id,
            payer.name.clone(),
            input.date,
        )
        .with_category(input.category)
        .with_splits(splits);

        if let Some(notes) = input.notes {
            expense.notes = notes;
        }
        expense.recurrence = input.recurrence;

        expense
            .validate()
            .map_err(|e| SplitError::Validation(e.to_string()))?;

        let check = expense.split_check();
        log_split_mismatch(&expense, &check);

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.description.clone()),
            &expense,
        )?;

        info!(expense = %expense.id, group = %group.id, amount = %expense.amount, "created expense");
        Ok(SavedExpense { expense, check })
    }

    pub fn get(&self, id: ExpenseId) -> SplitResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// Find an expense by full ID or the short ID shown in listings
    pub fn find(&self, identifier: &str) -> SplitResult<Option<Expense>> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            return self.storage.expenses.get(id);
        }

        let identifier = identifier.trim();
        Ok(self
            .storage
            .expenses
            .get_all()?
            .into_iter()
            .find(|e| e.id.to_string().eq_ignore_ascii_case(identifier)))
    }

    pub fn require(&self, identifier: &str) -> SplitResult<Expense> {
        self.find(identifier)?
            .ok_or_else(|| SplitError::expense_not_found(identifier))
    }

    /// Expenses of a group, newest first
    pub fn list(&self, group_id: GroupId, filter: &ExpenseFilter) -> SplitResult<Vec<Expense>> {
        let mut expenses: Vec<Expense> = self
            .storage
            .expenses
            .get_by_group(group_id)?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();

        if let Some(limit) = filter.limit {
            expenses.truncate(limit);
        }

        Ok(expenses)
    }

    /// Instances generated from a recurring template, in date order
    pub fn instances_of(&self, template_id: ExpenseId) -> SplitResult<Vec<Expense>> {
        self.storage.expenses.get_instances(template_id)
    }

    pub fn update(&self, id: ExpenseId, input: UpdateExpenseInput) -> SplitResult<SavedExpense> {
        let mut expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| SplitError::expense_not_found(id.to_string()))?;
        let before = expense.clone();

        if let Some(description) = input.description {
            expense.description = description.trim().to_string();
        }
        if let Some(amount) = input.amount {
            expense.amount = amount;
        }
        if let Some(date) = input.date {
            expense.date = date;
        }
        if let Some(category) = input.category {
            expense.category = category;
        }
        if let Some(notes) = input.notes {
            expense.notes = notes;
        }
        if let Some(split) = input.split {
            let group = self.load_group(expense.group_id)?;
            expense.splits = build_splits(&group, expense.amount, expense.paid_by, &split)?;
        }

        expense
            .validate()
            .map_err(|e| SplitError::Validation(e.to_string()))?;
        expense.touch();

        let check = expense.split_check();
        log_split_mismatch(&expense, &check);

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_update(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.description.clone()),
            &before,
            &expense,
        )?;

        debug!(expense = %expense.id, "updated expense");
        Ok(SavedExpense { expense, check })
    }

    /// Delete an expense; deleting a recurring template also deletes its instances
    ///
    /// Deleting a single generated instance records its date on the template
    /// so later generation does not bring it back. Returns every expense
    /// removed, the requested one first.
    pub fn delete(&self, id: ExpenseId) -> SplitResult<Vec<Expense>> {
        let expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| SplitError::expense_not_found(id.to_string()))?;

        let mut removed = vec![expense.clone()];
        if expense.is_recurring() {
            removed.extend(self.storage.expenses.get_instances(expense.id)?);
        }

        let skipped_on = match expense.template_id {
            Some(template_id) => self
                .storage
                .expenses
                .get(template_id)?
                .map(|mut template| {
                    let before = template.clone();
                    template.skip_occurrence(expense.date);
                    template.touch();
                    (before, template)
                }),
            None => None,
        };

        for e in &removed {
            self.storage.expenses.delete(e.id)?;
        }
        if let Some((_, template)) = &skipped_on {
            self.storage.expenses.upsert(template.clone())?;
        }
        self.storage.expenses.save()?;

        let mut entries: Vec<AuditEntry> = removed
            .iter()
            .map(|e| {
                AuditEntry::delete(
                    EntityType::Expense,
                    e.id.to_string(),
                    Some(e.description.clone()),
                    e,
                )
            })
            .collect();
        if let Some((before, template)) = &skipped_on {
            entries.push(AuditEntry::update(
                EntityType::Expense,
                template.id.to_string(),
                Some(template.description.clone()),
                before,
                template,
            ));
        }
        self.storage.audit().log_batch(&entries)?;

        info!(expense = %expense.id, removed = removed.len(), "deleted expense");
        Ok(removed)
    }

    /// Persist pending recurring instances up to `look_ahead`
    pub fn generate_recurring(
        &self,
        group_id: GroupId,
        look_ahead: NaiveDate,
    ) -> SplitResult<Vec<Expense>> {
        self.load_group(group_id)?;

        let created = generate_recurring_instances(&self.storage.expenses, group_id, look_ahead)?;
        let entries: Vec<AuditEntry> = created
            .iter()
            .map(|instance| {
                AuditEntry::create(
                    EntityType::Expense,
                    instance.id.to_string(),
                    Some(instance.description.clone()),
                    instance,
                )
            })
            .collect();
        self.storage.audit().log_batch(&entries)?;

        info!(group = %group_id, created = created.len(), %look_ahead, "generated recurring expenses");
        Ok(created)
    }

    /// The instances [`ExpenseService::generate_recurring`] would create, without saving
    pub fn preview_recurring(
        &self,
        group_id: GroupId,
        look_ahead: NaiveDate,
    ) -> SplitResult<Vec<Expense>> {
        let expenses = self.storage.expenses.get_by_group(group_id)?;
        let mut pending = collect_pending(&expenses, look_ahead);
        pending.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(pending)
    }

    fn load_group(&self, group_id: GroupId) -> SplitResult<Group> {
        self.storage
            .groups
            .get(group_id)?
            .ok_or_else(|| SplitError::group_not_found(group_id.to_string()))
    }
}

fn log_split_mismatch(expense: &Expense, check: &SplitCheck) {
    if !check.is_valid {
        warn!(
            expense = %expense.id,
            difference_cents = check.difference.cents(),
            currency = %expense.currency,
            "shares do not add up to the expense total"
        );
    }
}

/// Resolve a split mode against the group's members
fn build_splits(
    group: &Group,
    amount: Money,
    payer: MemberId,
    mode: &SplitMode,
) -> SplitResult<Vec<ExpenseSplit>> {
    match mode {
        SplitMode::Equal(ids) if ids.is_empty() => {
            if group.members.is_empty() {
                return Err(SplitError::Validation("Group has no members".into()));
            }
            Ok(equal_split(amount, &group.members, payer))
        }
        SplitMode::Equal(ids) => {
            let participants = ids
                .iter()
                .map(|id| {
                    group
                        .member(*id)
                        .cloned()
                        .ok_or_else(|| SplitError::member_not_found(id.to_string()))
                })
                .collect::<SplitResult<Vec<_>>>()?;
            Ok(equal_split(amount, &participants, payer))
        }
        SplitMode::Exact(shares) => shares
            .iter()
            .map(|(id, share)| {
                let member = group
                    .member(*id)
                    .ok_or_else(|| SplitError::member_not_found(id.to_string()))?;
                let mut split = ExpenseSplit::new(member.id, member.name.clone(), *share);
                split.paid = member.id == payer;
                Ok(split)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::MemberRole;
    use crate::services::GroupService;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn flat(storage: &Storage) -> Group {
        let groups = GroupService::new(storage);
        let group = groups.create("Flat", "USD", Some("Alice")).unwrap();
        groups.add_member(group.id, "Bob", MemberRole::Member).unwrap();
        groups.get(group.id).unwrap().unwrap()
    }

    fn input(group: &Group, description: &str, cents: i64, date: NaiveDate) -> CreateExpenseInput {
        CreateExpenseInput {
            group_id: group.id,
            description: description.to_string(),
            amount: Money::from_cents(cents),
            paid_by: group.members[0].id,
            date,
            category: ExpenseCategory::Food,
            notes: None,
            split: SplitMode::default(),
            recurrence: None,
        }
    }

    #[test]
    fn test_create_equal_split() {
        let (_temp_dir, storage) = setup();
        let group = flat(&storage);
        let service = ExpenseService::new(&storage);

        let saved = service
            .create(input(&group, "Dinner", 10001, ymd(2025, 3, 1)))
            .unwrap();

        assert!(saved.check.is_valid);
        assert_eq!(saved.expense.splits.len(), 2);
        assert_eq!(saved.expense.splits[0].share, Money::from_cents(5001));
        assert!(saved.expense.splits[0].paid);
        assert!(!saved.expense.splits[1].paid);
        assert_eq!(saved.expense.currency, "USD");
        assert_eq!(saved.expense.paid_by_name, "Alice");
    }

    #[test]
    fn test_create_mismatched_exact_split_warns() {
        let (_temp_dir, storage) = setup();
        let group = flat(&storage);
        let service = ExpenseService::new(&storage);

        let mut exp = input(&group, "Taxi", 3000, ymd(2025, 3, 2));
        exp.split = SplitMode::Exact(vec![
            (group.members[0].id, Money::from_cents(1000)),
            (group.members[1].id, Money::from_cents(1000)),
        ]);

        let saved = service.create(exp).unwrap();
        assert!(!saved.check.is_valid);
        assert_eq!(saved.check.difference, Money::from_cents(1000));
        assert!(service.get(saved.expense.id).unwrap().is_some());
    }

    #[test]
    fn test_create_rejects_outsiders_and_bad_input() {
        let (_temp_dir, storage) = setup();
        let group = flat(&storage);
        let service = ExpenseService::new(&storage);

        let mut outsider = input(&group, "Taxi", 3000, ymd(2025, 3, 2));
        outsider.paid_by = MemberId::new();
        assert!(service.create(outsider).unwrap_err().is_not_found());

        let mut stranger_share = input(&group, "Taxi", 3000, ymd(2025, 3, 2));
        stranger_share.split = SplitMode::Equal(vec![MemberId::new()]);
        assert!(service.create(stranger_share).unwrap_err().is_not_found());

        let zero = input(&group, "Nothing", 0, ymd(2025, 3, 2));
        assert!(service.create(zero).unwrap_err().is_validation());

        let blank = input(&group, "   ", 100, ymd(2025, 3, 2));
        assert!(service.create(blank).unwrap_err().is_validation());
    }

    #[test]
    fn test_list_with_filter() {
        let (_temp_dir, storage) = setup();
        let group = flat(&storage);
        let service = ExpenseService::new(&storage);

        service.create(input(&group, "Lunch", 2000, ymd(2025, 3, 1))).unwrap();
        let mut taxi = input(&group, "Taxi", 1500, ymd(2025, 3, 10));
        taxi.category = ExpenseCategory::Transport;
        service.create(taxi).unwrap();
        service.create(input(&group, "Dinner", 4000, ymd(2025, 4, 2))).unwrap();

        let all = service.list(group.id, &ExpenseFilter::new()).unwrap();
        assert_eq!(all[0].description, "Dinner");
        assert_eq!(all.len(), 3);

        let food = service
            .list(group.id, &ExpenseFilter::new().category(ExpenseCategory::Food))
            .unwrap();
        assert_eq!(food.len(), 2);

        let march = service
            .list(
                group.id,
                &ExpenseFilter::new().date_range(ymd(2025, 3, 1), ymd(2025, 3, 31)),
            )
            .unwrap();
        assert_eq!(march.len(), 2);

        let newest = service.list(group.id, &ExpenseFilter::new().limit(1)).unwrap();
        assert_eq!(newest.len(), 1);
    }

    #[test]
    fn test_find_by_short_id() {
        let (_temp_dir, storage) = setup();
        let group = flat(&storage);
        let service = ExpenseService::new(&storage);
        let saved = service.create(input(&group, "Lunch", 2000, ymd(2025, 3, 1))).unwrap();

        let short = saved.expense.id.to_string();
        assert_eq!(service.require(&short).unwrap().id, saved.expense.id);
        assert!(service.require("exp-00000000").unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_amount_and_split() {
        let (_temp_dir, storage) = setup();
        let group = flat(&storage);
        let service = ExpenseService::new(&storage);
        let saved = service.create(input(&group, "Lunch", 2000, ymd(2025, 3, 1))).unwrap();

        let changed = service
            .update(
                saved.expense.id,
                UpdateExpenseInput {
                    amount: Some(Money::from_cents(3000)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!changed.check.is_valid);

        let fixed = service
            .update(
                saved.expense.id,
                UpdateExpenseInput {
                    split: Some(SplitMode::default()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(fixed.check.is_valid);
        assert_eq!(fixed.expense.splits[1].share, Money::from_cents(1500));
    }

    #[test]
    fn test_recurring_generate_is_idempotent_and_delete_cascades() {
        let (_temp_dir, storage) = setup();
        let group = flat(&storage);
        let service = ExpenseService::new(&storage);

        let mut rent = input(&group, "Rent", 120000, ymd(2025, 1, 31));
        rent.recurrence = Some(RecurrenceRule::monthly());
        let template = service.create(rent).unwrap().expense;

        let preview = service.preview_recurring(group.id, ymd(2025, 4, 30)).unwrap();
        let dates: Vec<_> = preview.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![ymd(2025, 2, 28), ymd(2025, 3, 31), ymd(2025, 4, 30)]);

        let created = service.generate_recurring(group.id, ymd(2025, 4, 30)).unwrap();
        assert_eq!(created.len(), 3);
        assert!(service.generate_recurring(group.id, ymd(2025, 4, 30)).unwrap().is_empty());
        assert_eq!(service.instances_of(template.id).unwrap().len(), 3);

        let removed = service.delete(template.id).unwrap();
        assert_eq!(removed.len(), 4);
        assert_eq!(removed[0].id, template.id);
        assert!(service.list(group.id, &ExpenseFilter::new()).unwrap().is_empty());
    }

    struct MemoryStore {
        expenses: RefCell<Vec<Expense>>,
    }

    impl ExpenseStore for MemoryStore {
        fn fetch_expenses(&self, group_id: GroupId) -> SplitResult<Vec<Expense>> {
            Ok(self
                .expenses
                .borrow()
                .iter()
                .filter(|e| e.group_id == group_id)
                .cloned()
                .collect())
        }

        fn save(&self, expense: Expense) -> SplitResult<()> {
            let mut expenses = self.expenses.borrow_mut();
            expenses.retain(|e| e.id != expense.id);
            expenses.push(expense);
            Ok(())
        }

        fn delete(&self, id: ExpenseId) -> SplitResult<bool> {
            let mut expenses = self.expenses.borrow_mut();
            let before = expenses.len();
            expenses.retain(|e| e.id != id);
            Ok(expenses.len() != before)
        }
    }

    #[test]
    fn test_generate_against_any_store() {
        let group_id = GroupId::new();
        let payer = MemberId::new();
        let template = Expense::new(
            group_id,
            "Gym",
            Money::from_cents(4000),
            "USD",
            payer,
            "Alice",
            ymd(2025, 1, 1),
        )
        .with_splits(vec![ExpenseSplit::new(payer, "Alice", Money::from_cents(4000))])
        .with_recurrence(RecurrenceRule::weekly().until(ymd(2025, 1, 20)));

        let store = MemoryStore {
            expenses: RefCell::new(vec![template]),
        };

        let created = generate_recurring_instances(&store, group_id, ymd(2025, 12, 31)).unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(store.fetch_expenses(group_id).unwrap().len(), 3);

        let again = generate_recurring_instances(&store, group_id, ymd(2025, 12, 31)).unwrap();
        assert!(again.is_empty());
        assert!(store.fetch_expenses(GroupId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_deleted_instance_is_not_regenerated() {
        let (_temp_dir, storage) = setup();
        let group = flat(&storage);
        let service = ExpenseService::new(&storage);

        let mut gym = input(&group, "Gym", 4000, ymd(2025, 1, 1));
        gym.recurrence = Some(RecurrenceRule::monthly());
        let template = service.create(gym).unwrap().expense;

        let created = service.generate_recurring(group.id, ymd(2025, 4, 1)).unwrap();
        assert_eq!(created.len(), 3);
        let february = created.iter().find(|e| e.date == ymd(2025, 2, 1)).unwrap();

        let removed = service.delete(february.id).unwrap();
        assert_eq!(removed.len(), 1);

        let template = service.get(template.id).unwrap().unwrap();
        assert_eq!(template.skipped_dates, vec![ymd(2025, 2, 1)]);

        assert!(service.preview_recurring(group.id, ymd(2025, 4, 1)).unwrap().is_empty());
        assert!(service.generate_recurring(group.id, ymd(2025, 4, 1)).unwrap().is_empty());
        let dates: Vec<_> = service
            .instances_of(template.id)
            .unwrap()
            .iter()
            .map(|e| e.date)
            .collect();
        assert_eq!(dates, vec![ymd(2025, 3, 1), ymd(2025, 4, 1)]);

        let entries = storage.audit().read_all().unwrap();
        let last = entries.last().unwrap();
        assert_eq!(last.entity_id, template.id.to_string());
        assert_eq!(
            last.changed_fields.as_deref(),
            Some(&["skipped_dates".to_string()][..])
        );
    }

    #[test]
    fn test_long_backlog_is_generated_over_several_runs() {
        let (_temp_dir, storage) = setup();
        let group = flat(&storage);
        let service = ExpenseService::new(&storage);

        let mut coffee = input(&group, "Coffee", 300, ymd(2022, 1, 1));
        coffee.recurrence = Some(RecurrenceRule::daily());
        let template = service.create(coffee).unwrap().expense;
        let audit_before = storage.audit().read_all().unwrap().len();

        let bound = ymd(2025, 12, 31);
        let first = service.generate_recurring(group.id, bound).unwrap();
        assert_eq!(first.len(), MAX_OCCURRENCES);
        assert_eq!(first.last().unwrap().date, ymd(2024, 10, 21));

        let second = service.generate_recurring(group.id, bound).unwrap();
        assert_eq!(second.len(), 436);
        assert_eq!(second.last().unwrap().date, bound);

        assert!(service.generate_recurring(group.id, bound).unwrap().is_empty());
        assert_eq!(service.instances_of(template.id).unwrap().len(), 1460);
        assert_eq!(
            storage.audit().read_all().unwrap().len() - audit_before,
            1460
        );
    }
}
