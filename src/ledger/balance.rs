//! Balance aggregator
//!
//! Net balance of a member across a set of expenses:
//!
//! ```text
//! net(m) = sum over expenses paid by m of (amount - own share of m)
//!        - sum over expenses m takes part in but did not pay of share(m)
//! ```
//!
//! Positive means the group owes the member; negative means the member owes
//! the group. Settlements move the payer up and the receiver down by the
//! settled amount. When every expense's shares add up to its amount the
//! nets of all members sum to zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Expense, Member, MemberId, Money, Settlement};

/// Net balance for a single member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub member_name: String,
    pub net: Money,
}

impl MemberBalance {
    /// The group owes this member
    pub fn is_owed(&self) -> bool {
        self.net.is_positive()
    }

    /// This member owes the group
    pub fn owes(&self) -> bool {
        self.net.is_negative()
    }

    pub fn is_settled(&self) -> bool {
        self.net.is_zero()
    }
}

/// A payment that would move two balances toward zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedTransfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// Net balance per member from expenses alone
///
/// Every listed member gets an entry, zero if they took part in nothing.
/// Payers or participants missing from `members` are still accounted for.
pub fn compute_balances(members: &[MemberId], expenses: &[Expense]) -> BTreeMap<MemberId, Money> {
    let mut balances: BTreeMap<MemberId, Money> =
        members.iter().map(|id| (*id, Money::zero())).collect();

    for expense in expenses {
        let own_share = expense.share_of(expense.paid_by).unwrap_or_default();
        *balances.entry(expense.paid_by).or_default() += expense.amount - own_share;

        for split in expense.splits.iter().filter(|s| s.member_id != expense.paid_by) {
            *balances.entry(split.member_id).or_default() -= split.share;
        }
    }

    balances
}

/// Net balance per member from expenses and recorded settlements
pub fn compute_balances_with_settlements(
    members: &[MemberId],
    expenses: &[Expense],
    settlements: &[Settlement],
) -> BTreeMap<MemberId, Money> {
    let mut balances = compute_balances(members, expenses);
    for settlement in settlements {
        *balances.entry(settlement.from).or_default() += settlement.amount;
        *balances.entry(settlement.to).or_default() -= settlement.amount;
    }
    balances
}

/// Balances with display names, in member-list order
///
/// Former members who still appear in expenses follow, named from the
/// expense records.
pub fn member_balances(
    members: &[Member],
    expenses: &[Expense],
    settlements: &[Settlement],
) -> Vec<MemberBalance> {
    let ids: Vec<MemberId> = members.iter().map(|m| m.id).collect();
    let mut balances = compute_balances_with_settlements(&ids, expenses, settlements);

    let mut result: Vec<MemberBalance> = members
        .iter()
        .map(|m| MemberBalance {
            member_id: m.id,
            member_name: m.name.clone(),
            net: balances.remove(&m.id).unwrap_or_default(),
        })
        .collect();

    for (member_id, net) in balances {
        result.push(MemberBalance {
            member_id,
            member_name: recorded_name(member_id, expenses),
            net,
        });
    }

    result
}

fn recorded_name(member_id: MemberId, expenses: &[Expense]) -> String {
    expenses
        .iter()
        .find_map(|e| {
            if e.paid_by == member_id && !e.paid_by_name.is_empty() {
                return Some(e.paid_by_name.clone());
            }
            e.splits
                .iter()
                .find(|s| s.member_id == member_id && !s.member_name.is_empty())
                .map(|s| s.member_name.clone())
        })
        .unwrap_or_else(|| member_id.to_string())
}

/// Greedy settle-up plan: the largest debtor pays the largest creditor
///
/// For balances that sum to zero, applying every suggested transfer brings
/// all balances to zero. Ties are broken by member ID so the plan is stable.
pub fn suggest_settlements(balances: &BTreeMap<MemberId, Money>) -> Vec<SuggestedTransfer> {
    let mut creditors: Vec<(MemberId, Money)> = balances
        .iter()
        .filter(|(_, net)| net.is_positive())
        .map(|(id, net)| (*id, *net))
        .collect();
    let mut debtors: Vec<(MemberId, Money)> = balances
        .iter()
        .filter(|(_, net)| net.is_negative())
        .map(|(id, net)| (*id, net.abs()))
        .collect();

    creditors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    debtors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut transfers = Vec::new();
    let (mut ci, mut di) = (0, 0);
    while ci < creditors.len() && di < debtors.len() {
        let amount = creditors[ci].1.min(debtors[di].1);
        transfers.push(SuggestedTransfer {
            from: debtors[di].0,
            to: creditors[ci].0,
            amount,
        });
        creditors[ci].1 -= amount;
        debtors[di].1 -= amount;
        if creditors[ci].1.is_zero() {
            ci += 1;
        }
        if debtors[di].1.is_zero() {
            di += 1;
        }
    }

    transfers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::split::equal_split;
    use crate::models::{ExpenseSplit, GroupId, MemberRole};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn members(names: &[&str]) -> Vec<Member> {
        names
            .iter()
            .map(|n| Member::new(*n, MemberRole::Member))
            .collect()
    }

    fn expense(payer: &Member, cents: i64, splits: Vec<ExpenseSplit>) -> Expense {
        Expense::new(
            GroupId::new(),
            "Shared",
            Money::from_cents(cents),
            "USD",
            payer.id,
            payer.name.clone(),
            date(),
        )
        .with_splits(splits)
    }

    fn equal(payer: &Member, cents: i64, among: &[Member]) -> Expense {
        expense(payer, cents, equal_split(Money::from_cents(cents), among, payer.id))
    }

    fn total(balances: &BTreeMap<MemberId, Money>) -> Money {
        balances.values().copied().sum()
    }

    #[test]
    fn test_two_members_equal_split() {
        let group = members(&["A", "B"]);
        let ids: Vec<_> = group.iter().map(|m| m.id).collect();
        let expenses = vec![equal(&group[0], 10000, &group)];

        let balances = compute_balances(&ids, &expenses);
        assert_eq!(balances[&group[0].id], Money::from_cents(5000));
        assert_eq!(balances[&group[1].id], Money::from_cents(-5000));
        assert_eq!(total(&balances), Money::zero());
    }

    #[test]
    fn test_balances_net_to_zero() {
        let group = members(&["A", "B", "C", "D"]);
        let ids: Vec<_> = group.iter().map(|m| m.id).collect();
        let expenses = vec![
            equal(&group[0], 10000, &group),
            equal(&group[1], 3333, &group[1..3]),
            equal(&group[2], 777, &group),
            // Payer is not a participant
            equal(&group[3], 4500, &group[0..2]),
        ];

        let balances = compute_balances(&ids, &expenses);
        assert_eq!(total(&balances), Money::zero());
        assert_eq!(balances.len(), 4);
        // D paid 45.00 for A and B and only owes shares of the others
        assert_eq!(
            balances[&group[3].id],
            Money::from_cents(4500 - 2500 - 194)
        );
    }

    #[test]
    fn test_payer_outside_split() {
        let group = members(&["A", "B"]);
        let ids: Vec<_> = group.iter().map(|m| m.id).collect();
        let expenses = vec![expense(
            &group[0],
            2000,
            vec![ExpenseSplit::new(group[1].id, "B", Money::from_cents(2000))],
        )];
        let balances = compute_balances(&ids, &expenses);
        assert_eq!(balances[&group[0].id], Money::from_cents(2000));
        assert_eq!(balances[&group[1].id], Money::from_cents(-2000));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(compute_balances(&[], &[]).is_empty());

        let group = members(&["A"]);
        let balances = compute_balances(&[group[0].id], &[]);
        assert_eq!(balances[&group[0].id], Money::zero());
    }

    #[test]
    fn test_unknown_participant_is_counted() {
        let group = members(&["A"]);
        let outsider = Member::new("Zed", MemberRole::Member);
        let expenses = vec![equal(&group[0], 1000, &[group[0].clone(), outsider.clone()])];

        let balances = compute_balances(&[group[0].id], &expenses);
        assert_eq!(balances[&outsider.id], Money::from_cents(-500));

        let named = member_balances(&group, &expenses, &[]);
        assert_eq!(named.len(), 2);
        assert_eq!(named[1].member_name, "Zed");
    }

    #[test]
    fn test_settlements_move_balances() {
        let group = members(&["A", "B"]);
        let ids: Vec<_> = group.iter().map(|m| m.id).collect();
        let expenses = vec![equal(&group[0], 10000, &group)];
        let settlement = Settlement::new(
            GroupId::new(),
            group[1].id,
            group[0].id,
            Money::from_cents(3000),
            date(),
        );

        let balances = compute_balances_with_settlements(&ids, &expenses, &[settlement]);
        assert_eq!(balances[&group[0].id], Money::from_cents(2000));
        assert_eq!(balances[&group[1].id], Money::from_cents(-2000));
        assert_eq!(total(&balances), Money::zero());
    }

    #[test]
    fn test_member_balances_order_and_flags() {
        let group = members(&["A", "B", "C"]);
        let expenses = vec![equal(&group[1], 900, &group[0..2])];
        let balances = member_balances(&group, &expenses, &[]);

        let names: Vec<_> = balances.iter().map(|b| b.member_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(balances[0].owes());
        assert!(balances[1].is_owed());
        assert!(balances[2].is_settled());
    }

    #[test]
    fn test_compute_balances_is_idempotent() {
        let group = members(&["A", "B", "C"]);
        let ids: Vec<_> = group.iter().map(|m| m.id).collect();
        let expenses = vec![equal(&group[0], 1001, &group), equal(&group[2], 250, &group)];
        assert_eq!(
            compute_balances(&ids, &expenses),
            compute_balances(&ids, &expenses)
        );
    }

    #[test]
    fn test_suggest_settlements_clears_all_balances() {
        let group = members(&["A", "B", "C", "D"]);
        let ids: Vec<_> = group.iter().map(|m| m.id).collect();
        let expenses = vec![
            equal(&group[0], 12000, &group),
            equal(&group[1], 4000, &group),
            equal(&group[2], 999, &group[2..4]),
        ];

        let mut balances = compute_balances(&ids, &expenses);
        let transfers = suggest_settlements(&balances);
        assert!(transfers.len() < group.len());

        for t in &transfers {
            assert!(t.amount.is_positive());
            *balances.get_mut(&t.from).unwrap() += t.amount;
            *balances.get_mut(&t.to).unwrap() -= t.amount;
        }
        assert!(balances.values().all(|b| b.is_zero()));
    }

    #[test]
    fn test_suggest_settlements_when_settled() {
        let group = members(&["A", "B"]);
        let balances = compute_balances(&[group[0].id, group[1].id], &[]);
        assert!(suggest_settlements(&balances).is_empty());
    }
}
