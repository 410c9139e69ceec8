//! Spending Report
//!
//! Spending analysis for one group: totals per category with their share of
//! the whole, and what each member paid versus what they consumed.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;

use crate::error::{SplitError, SplitResult};
use crate::ledger::percentage_of;
use crate::models::{ExpenseCategory, GroupId, MemberId, Money};
use crate::services::{ExpenseFilter, ExpenseService, GroupService};
use crate::storage::Storage;

/// Spending for one category
#[derive(Debug, Clone)]
pub struct SpendingByCategory {
    pub category: ExpenseCategory,
    pub total: Money,
    pub expense_count: usize,
    /// Percentage of the report total
    pub percentage: f64,
}

/// What a member paid out and what their shares came to
#[derive(Debug, Clone)]
pub struct SpendingByMember {
    pub member_id: MemberId,
    pub member_name: String,
    /// Sum of expenses this member paid for
    pub paid: Money,
    /// Sum of this member's shares
    pub share: Money,
    /// Percentage of the report total paid by this member
    pub percentage: f64,
}

/// Spending Report
#[derive(Debug, Clone)]
pub struct SpendingReport {
    pub group_id: GroupId,
    pub group_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Categories with spending, largest first
    pub categories: Vec<SpendingByCategory>,
    /// Members in group order, followed by former members still on record
    pub members: Vec<SpendingByMember>,
    pub total_spending: Money,
    pub total_expenses: usize,
}

impl SpendingReport {
    /// Generate a spending report for a group, optionally limited to a date range
    pub fn generate(
        storage: &Storage,
        group_id: GroupId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> SplitResult<Self> {
        let group = GroupService::new(storage)
            .get(group_id)?
            .ok_or_else(|| SplitError::group_not_found(group_id.to_string()))?;

        let mut filter = ExpenseFilter::new();
        filter.start_date = start_date;
        filter.end_date = end_date;
        let expenses = ExpenseService::new(storage).list(group_id, &filter)?;

        let total_spending: Money = expenses.iter().map(|e| e.amount).sum();

        let mut by_category: BTreeMap<ExpenseCategory, (Money, usize)> = BTreeMap::new();
        let mut paid: BTreeMap<MemberId, Money> = BTreeMap::new();
        let mut shares: BTreeMap<MemberId, Money> = BTreeMap::new();
        let mut names: BTreeMap<MemberId, String> = BTreeMap::new();

        for expense in &expenses {
            let entry = by_category
                .entry(expense.category)
                .or_insert((Money::zero(), 0));
            entry.0 += expense.amount;
            entry.1 += 1;

            *paid.entry(expense.paid_by).or_default() += expense.amount;
            names
                .entry(expense.paid_by)
                .or_insert_with(|| expense.paid_by_name.clone());

            for split in &expense.splits {
                *shares.entry(split.member_id).or_default() += split.share;
                names
                    .entry(split.member_id)
                    .or_insert_with(|| split.member_name.clone());
            }
        }

        let mut categories: Vec<SpendingByCategory> = by_category
            .into_iter()
            .map(|(category, (total, expense_count))| SpendingByCategory {
                category,
                total,
                expense_count,
                percentage: percentage_of(total, total_spending),
            })
            .collect();
        categories.sort_by(|a, b| b.total.cmp(&a.total));

        let member_row = |member_id: MemberId, member_name: String| {
            let member_paid = paid.get(&member_id).copied().unwrap_or_default();
            SpendingByMember {
                member_id,
                member_name,
                paid: member_paid,
                share: shares.get(&member_id).copied().unwrap_or_default(),
                percentage: percentage_of(member_paid, total_spending),
            }
        };

        let mut members: Vec<SpendingByMember> = group
            .members
            .iter()
            .map(|m| member_row(m.id, m.name.clone()))
            .collect();

        for (member_id, name) in names {
            if !group.is_member(member_id) {
                members.push(member_row(member_id, name));
            }
        }

        Ok(Self {
            group_id,
            group_name: group.name,
            start_date,
            end_date,
            categories,
            members,
            total_spending,
            total_expenses: expenses.len(),
        })
    }

    fn period_label(&self) -> String {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => format!("{} to {}", start, end),
            (Some(start), None) => format!("since {}", start),
            (None, Some(end)) => format!("until {}", end),
            (None, None) => "all time".to_string(),
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Spending Report: {} ({})\n",
            self.group_name,
            self.period_label()
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("Total Spending: {}\n", self.total_spending));
        output.push_str(&format!("Total Expenses: {}\n\n", self.total_expenses));

        output.push_str(&format!(
            "{:<25} {:>12} {:>8} {:>8}\n",
            "Category", "Amount", "Count", "%"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for category in &self.categories {
            output.push_str(&format!(
                "{:<25} {:>12} {:>8} {:>7.1}%\n",
                category.category.to_string(),
                category.total.to_string(),
                category.expense_count,
                category.percentage
            ));
        }

        output.push_str(&format!(
            "\n{:<25} {:>12} {:>12} {:>8}\n",
            "Member", "Paid", "Share", "%"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for member in &self.members {
            output.push_str(&format!(
                "{:<25} {:>12} {:>12} {:>7.1}%\n",
                member.member_name,
                member.paid.to_string(),
                member.share.to_string(),
                member.percentage
            ));
        }

        output
    }

    /// Export the category breakdown as CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> SplitResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["Group", "Category", "Amount", "Expense Count", "Percentage"])?;

        for category in &self.categories {
            csv_writer.write_record([
                self.group_name.clone(),
                category.category.to_string(),
                format!("{:.2}", category.total.to_decimal()),
                category.expense_count.to_string(),
                format!("{:.2}", category.percentage),
            ])?;
        }

        csv_writer.write_record([
            self.group_name.clone(),
            "TOTAL".to_string(),
            format!("{:.2}", self.total_spending.to_decimal()),
            self.total_expenses.to_string(),
            "100.00".to_string(),
        ])?;

        csv_writer
            .flush()
            .map_err(|e| SplitError::Export(e.to_string()))?;
        Ok(())
    }

    /// The `limit` categories with the most spending
    pub fn top_categories(&self, limit: usize) -> &[SpendingByCategory] {
        &self.categories[..limit.min(self.categories.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::MemberRole;
    use crate::services::{CreateExpenseInput, SplitMode};
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_storage() -> (TempDir, Storage, GroupId) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let groups = GroupService::new(&storage);
        let group = groups.create("Flat", "USD", Some("Alice")).unwrap();
        groups.add_member(group.id, "Bob", MemberRole::Member).unwrap();
        (temp_dir, storage, group.id)
    }

    fn add(storage: &Storage, group_id: GroupId, payer: usize, category: ExpenseCategory, cents: i64, date: NaiveDate) {
        let group = GroupService::new(storage).get(group_id).unwrap().unwrap();
        ExpenseService::new(storage)
            .create(CreateExpenseInput {
                group_id,
                description: category.to_string(),
                amount: Money::from_cents(cents),
                paid_by: group.members[payer].id,
                date,
                category,
                notes: None,
                split: SplitMode::default(),
                recurrence: None,
            })
            .unwrap();
    }

    #[test]
    fn test_generate_spending_report() {
        let (_temp_dir, storage, group_id) = create_test_storage();
        add(&storage, group_id, 0, ExpenseCategory::Food, 6000, ymd(2025, 1, 10));
        add(&storage, group_id, 1, ExpenseCategory::Utilities, 3000, ymd(2025, 1, 15));
        add(&storage, group_id, 0, ExpenseCategory::Food, 1000, ymd(2025, 1, 20));

        let report = SpendingReport::generate(&storage, group_id, None, None).unwrap();

        assert_eq!(report.total_spending, Money::from_cents(10000));
        assert_eq!(report.total_expenses, 3);
        assert_eq!(report.categories[0].category, ExpenseCategory::Food);
        assert_eq!(report.categories[0].expense_count, 2);
        assert!((report.categories[0].percentage - 70.0).abs() < 1e-9);

        assert_eq!(report.members[0].member_name, "Alice");
        assert_eq!(report.members[0].paid, Money::from_cents(7000));
        assert_eq!(report.members[0].share, Money::from_cents(5000));
        assert_eq!(report.members[1].paid, Money::from_cents(3000));
    }

    #[test]
    fn test_date_range_and_empty_group() {
        let (_temp_dir, storage, group_id) = create_test_storage();
        add(&storage, group_id, 0, ExpenseCategory::Food, 6000, ymd(2025, 1, 10));
        add(&storage, group_id, 1, ExpenseCategory::Travel, 3000, ymd(2025, 2, 15));

        let report =
            SpendingReport::generate(&storage, group_id, Some(ymd(2025, 2, 1)), None).unwrap();
        assert_eq!(report.total_expenses, 1);
        assert_eq!(report.top_categories(5).len(), 1);
        assert!(report.format_terminal().contains("since 2025-02-01"));

        let empty =
            SpendingReport::generate(&storage, group_id, Some(ymd(2026, 1, 1)), None).unwrap();
        assert!(empty.categories.is_empty());
        assert_eq!(empty.members[0].percentage, 0.0);
    }

    #[test]
    fn test_export_csv() {
        let (_temp_dir, storage, group_id) = create_test_storage();
        add(&storage, group_id, 0, ExpenseCategory::Food, 2500, ymd(2025, 1, 10));

        let report = SpendingReport::generate(&storage, group_id, None, None).unwrap();
        let mut csv_output = Vec::new();
        report.export_csv(&mut csv_output).unwrap();

        let csv_string = String::from_utf8(csv_output).unwrap();
        assert!(csv_string.starts_with("Group,Category,Amount,Expense Count,Percentage"));
        assert!(csv_string.contains("Flat,Food,25.00,1,100.00"));
        assert!(csv_string.contains("Flat,TOTAL,25.00,1,100.00"));
    }
}
