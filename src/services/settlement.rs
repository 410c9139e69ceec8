//! Settlement service
//!
//! Records payments between members and derives each member's net balance
//! from a group's expenses and settlements.

use chrono::NaiveDate;
use tracing::info;

use crate::audit::EntityType;
use crate::error::{SplitError, SplitResult};
use crate::ledger::{
    compute_balances_with_settlements, member_balances, suggest_settlements, MemberBalance,
    SuggestedTransfer,
};
use crate::models::{Group, GroupId, MemberId, Money, Settlement};
use crate::storage::Storage;

/// Service for settlements and balances
pub struct SettlementService<'a> {
    storage: &'a Storage,
}

impl<'a> SettlementService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record that `from` paid `to` the given amount
    pub fn record(
        &self,
        group_id: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
    ) -> SplitResult<Settlement> {
        let group = self.load_group(group_id)?;

        for member_id in [from, to] {
            if !group.is_member(member_id) {
                return Err(SplitError::member_not_found(member_id.to_string()));
            }
        }

        let mut settlement = Settlement::new(group_id, from, to, amount, date);
        if let Some(note) = note {
            settlement.note = note;
        }

        settlement.validate().map_err(SplitError::Validation)?;

        self.storage.settlements.upsert(settlement.clone())?;
        self.storage.settlements.save()?;

        self.storage.log_create(
            EntityType::Settlement,
            settlement.id.to_string(),
            Some(self.describe(&group, &settlement)),
            &settlement,
        )?;

        info!(settlement = %settlement.id, group = %group_id, amount = %amount, "recorded settlement");
        Ok(settlement)
    }

    /// Settlements of a group in date order
    pub fn list(&self, group_id: GroupId) -> SplitResult<Vec<Settlement>> {
        self.storage.settlements.get_by_group(group_id)
    }

    /// Net balance of every member, in member-list order
    pub fn balances(&self, group_id: GroupId) -> SplitResult<Vec<MemberBalance>> {
        let group = self.load_group(group_id)?;
        let expenses = self.storage.expenses.get_by_group(group_id)?;
        let settlements = self.storage.settlements.get_by_group(group_id)?;
        Ok(member_balances(&group.members, &expenses, &settlements))
    }

    /// Transfers that would bring every balance in the group to zero
    pub fn suggest(&self, group_id: GroupId) -> SplitResult<Vec<SuggestedTransfer>> {
        let group = self.load_group(group_id)?;
        let expenses = self.storage.expenses.get_by_group(group_id)?;
        let settlements = self.storage.settlements.get_by_group(group_id)?;
        let balances =
            compute_balances_with_settlements(&group.member_ids(), &expenses, &settlements);
        Ok(suggest_settlements(&balances))
    }

    fn describe(&self, group: &Group, settlement: &Settlement) -> String {
        let name = |id: MemberId| {
            group
                .member(id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        format!("{} paid {}", name(settlement.from), name(settlement.to))
    }

    fn load_group(&self, group_id: GroupId) -> SplitResult<Group> {
        self.storage
            .groups
            .get(group_id)?
            .ok_or_else(|| SplitError::group_not_found(group_id.to_string()))
    }
}
