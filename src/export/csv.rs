//! CSV export of a group's expenses and settlements

use std::io::Write;

use crate::error::{SplitError, SplitResult};
use crate::models::GroupId;
use crate::storage::Storage;

/// Export the expenses of a group to CSV
///
/// One row per expense, followed by one `split` row per share. Split rows
/// repeat the expense ID with a `-split` suffix so they sort together.
pub fn export_expenses_csv<W: Write>(
    storage: &Storage,
    group_id: GroupId,
    writer: W,
) -> SplitResult<usize> {
    let group = storage
        .groups
        .get(group_id)?
        .ok_or_else(|| SplitError::group_not_found(group_id.to_string()))?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "ID",
        "Date",
        "Group",
        "Description",
        "Category",
        "Paid By",
        "Member",
        "Amount",
        "Currency",
        "Recurring",
        "Notes",
    ])?;

    let expenses = storage.expenses.get_by_group(group_id)?;
    for expense in &expenses {
        let recurring = match (&expense.recurrence, expense.template_id) {
            (Some(rule), _) => rule.describe(),
            (None, Some(template)) => format!("from {}", template),
            (None, None) => String::new(),
        };

        csv_writer.write_record([
            expense.id.as_uuid().to_string(),
            expense.date.to_string(),
            group.name.clone(),
            expense.description.clone(),
            expense.category.to_string(),
            expense.paid_by_name.clone(),
            String::new(),
            format!("{:.2}", expense.amount.to_decimal()),
            expense.currency.clone(),
            recurring,
            expense.notes.clone(),
        ])?;

        for split in &expense.splits {
            csv_writer.write_record([
                format!("{}-split", expense.id.as_uuid()),
                expense.date.to_string(),
                group.name.clone(),
                expense.description.clone(),
                expense.category.to_string(),
                expense.paid_by_name.clone(),
                split.member_name.clone(),
                format!("{:.2}", split.share.to_decimal()),
                expense.currency.clone(),
                String::new(),
                String::new(),
            ])?;
        }
    }

    csv_writer
        .flush()
        .map_err(|e| SplitError::Export(e.to_string()))?;
    Ok(expenses.len())
}

/// Export the settlements of a group to CSV
pub fn export_settlements_csv<W: Write>(
    storage: &Storage,
    group_id: GroupId,
    writer: W,
) -> SplitResult<usize> {
    let group = storage
        .groups
        .get(group_id)?
        .ok_or_else(|| SplitError::group_not_found(group_id.to_string()))?;

    let name_of = |id| {
        group
            .member(id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["ID", "Date", "From", "To", "Amount", "Note"])?;

    let settlements = storage.settlements.get_by_group(group_id)?;
    for settlement in &settlements {
        csv_writer.write_record([
            settlement.id.as_uuid().to_string(),
            settlement.date.to_string(),
            name_of(settlement.from),
            name_of(settlement.to),
            format!("{:.2}", settlement.amount.to_decimal()),
            settlement.note.clone(),
        ])?;
    }

    csv_writer
        .flush()
        .map_err(|e| SplitError::Export(e.to_string()))?;
    Ok(settlements.len())
}
