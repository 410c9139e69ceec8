//! Recurrence engine
//!
//! Expands a recurrence rule into the dates on which a template expense
//! repeats, and materializes one expense per date inside a bounded
//! look-ahead window.
//!
//! Occurrence `k` is always computed from the anchor (`anchor + k * interval`
//! periods) rather than from the previous occurrence, so month-end dates do
//! not drift: Jan 31 repeats on Feb 28, Mar 31, Apr 30.

use std::collections::HashSet;

use chrono::{Days, Months, NaiveDate};
use uuid::Uuid;

use crate::models::{Expense, ExpenseId, Frequency, RecurrenceRule};

/// Upper bound on the dates returned by a single expansion
///
/// For [`pending_instances`] the bound applies to dates not yet covered, so an
/// expansion that hits it resumes from where it stopped on the next call.
pub const MAX_OCCURRENCES: usize = 1024;

/// Move `date` forward by `steps` periods of `frequency`
///
/// Monthly and yearly steps clamp the day to the length of the target month.
/// Returns `None` if the result is outside the representable date range.
pub fn advance(date: NaiveDate, frequency: Frequency, steps: u32) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => date.checked_add_days(Days::new(u64::from(steps))),
        Frequency::Weekly => date.checked_add_days(Days::new(u64::from(steps) * 7)),
        Frequency::Monthly => date.checked_add_months(Months::new(steps)),
        Frequency::Yearly => date.checked_add_months(Months::new(steps.checked_mul(12)?)),
    }
}

/// The date `months` calendar months after `from`
pub fn look_ahead_bound(from: NaiveDate, months: u32) -> NaiveDate {
    from.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Every occurrence after `anchor` up to the rule's end date and `look_ahead`
///
/// Ends when a date passes either bound or leaves the representable range,
/// so it is finite for any input.
fn occurrence_dates(
    anchor: NaiveDate,
    rule: &RecurrenceRule,
    look_ahead: NaiveDate,
) -> impl Iterator<Item = NaiveDate> + '_ {
    let interval = rule.effective_interval();
    (1u32..)
        .map_while(move |k| {
            let steps = k.checked_mul(interval)?;
            advance(anchor, rule.frequency, steps)
        })
        .take_while(move |cursor| {
            *cursor <= look_ahead && rule.end_date.map_or(true, |end| *cursor <= end)
        })
}

/// Dates on which a rule anchored at `anchor` repeats, up to `look_ahead`
///
/// The anchor itself is not included. Generation stops at the first date
/// past the rule's end date or past `look_ahead`; both bounds are inclusive.
/// A non-positive interval behaves as 1. At most [`MAX_OCCURRENCES`] dates
/// are returned.
pub fn occurrences(anchor: NaiveDate, rule: &RecurrenceRule, look_ahead: NaiveDate) -> Vec<NaiveDate> {
    occurrence_dates(anchor, rule, look_ahead)
        .take(MAX_OCCURRENCES)
        .collect()
}

/// Expand a template into its instances within the look-ahead window
///
/// Expenses without a recurrence rule yield nothing.
pub fn materialize(template: &Expense, look_ahead: NaiveDate) -> Vec<Expense> {
    let Some(rule) = &template.recurrence else {
        return Vec::new();
    };
    occurrences(template.date, rule, look_ahead)
        .into_iter()
        .map(|date| instance_of(template, date))
        .collect()
}

/// Instances of `template` still missing from `existing`
///
/// Dates already covered by an instance in `existing`, and dates the template
/// records as skipped, are passed over without counting toward
/// [`MAX_OCCURRENCES`]. A template whose backlog is larger than the cap is
/// therefore filled in over several calls.
pub fn pending_instances(
    template: &Expense,
    existing: &[Expense],
    look_ahead: NaiveDate,
) -> Vec<Expense> {
    let Some(rule) = &template.recurrence else {
        return Vec::new();
    };

    let covered: HashSet<NaiveDate> = existing
        .iter()
        .filter(|e| e.template_id == Some(template.id))
        .map(|e| e.date)
        .chain(template.skipped_dates.iter().copied())
        .collect();

    occurrence_dates(template.date, rule, look_ahead)
        .filter(|date| !covered.contains(date))
        .take(MAX_OCCURRENCES)
        .map(|date| instance_of(template, date))
        .collect()
}

/// Stable ID for the instance of `template` on `date`
///
/// Derived from the template ID so that expanding the same template twice
/// yields the same instances.
pub fn instance_id(template: ExpenseId, date: NaiveDate) -> ExpenseId {
    let name = date.format("%Y-%m-%d").to_string();
    ExpenseId::from(Uuid::new_v5(template.as_uuid(), name.as_bytes()))
}

fn instance_of(template: &Expense, date: NaiveDate) -> Expense {
    let mut instance = template.clone();
    instance.id = instance_id(template.id, date);
    instance.date = date;
    instance.recurrence = None;
    instance.template_id = Some(template.id);
    instance.skipped_dates.clear();
    for split in &mut instance.splits {
        split.paid = split.member_id == template.paid_by;
    }
    instance.created_at = template.updated_at;
    instance.updated_at = template.updated_at;
    instance
}
