//! Group service
//!
//! Business logic for groups and their members: creation, membership
//! changes, renaming and cascading deletion.

use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{SplitError, SplitResult};
use crate::models::{Group, GroupId, Member, MemberRole};
use crate::storage::Storage;

/// Service for group management
pub struct GroupService<'a> {
    storage: &'a Storage,
}

/// What was removed along with a deleted group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDeletion {
    pub expenses_removed: usize,
    pub settlements_removed: usize,
}

impl<'a> GroupService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a group; `creator`, when given, joins as its first admin
    pub fn create(&self, name: &str, currency: &str, creator: Option<&str>) -> SplitResult<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SplitError::Validation("Group name cannot be empty".into()));
        }

        if self.storage.groups.name_exists(name, None)? {
            return Err(SplitError::Duplicate {
                entity_type: "Group",
                identifier: name.to_string(),
            });
        }

        let mut group = Group::new(name, currency.trim().to_uppercase());
        if let Some(creator) = creator {
            let admin_id = group
                .add_member(creator, MemberRole::Admin)
                .map_err(|e| SplitError::Validation(e.to_string()))?
                .id;
            group.created_by = Some(admin_id);
        }

        group
            .validate()
            .map_err(|e| SplitError::Validation(e.to_string()))?;

        self.storage.groups.upsert(group.clone())?;
        self.storage.groups.save()?;

        self.storage.log_create(
            EntityType::Group,
            group.id.to_string(),
            Some(group.name.clone()),
            &group,
        )?;

        info!(group = %group.id, name = %group.name, "created group");
        Ok(group)
    }

    pub fn get(&self, id: GroupId) -> SplitResult<Option<Group>> {
        self.storage.groups.get(id)
    }

    /// Find a group by name, full ID or the short ID shown in listings
    pub fn find(&self, identifier: &str) -> SplitResult<Option<Group>> {
        if let Some(group) = self.storage.groups.get_by_name(identifier)? {
            return Ok(Some(group));
        }

        if let Ok(id) = identifier.parse::<GroupId>() {
            return self.storage.groups.get(id);
        }

        let identifier = identifier.trim();
        Ok(self
            .storage
            .groups
            .get_all()?
            .into_iter()
            .find(|g| g.id.to_string().eq_ignore_ascii_case(identifier)))
    }

    /// Like [`GroupService::find`], failing when nothing matches
    pub fn require(&self, identifier: &str) -> SplitResult<Group> {
        self.find(identifier)?
            .ok_or_else(|| SplitError::group_not_found(identifier))
    }

    /// All groups ordered by name
    pub fn list(&self) -> SplitResult<Vec<Group>> {
        self.storage.groups.get_all()
    }

    pub fn add_member(&self, group_id: GroupId, name: &str, role: MemberRole) -> SplitResult<Member> {
        let mut group = self.load(group_id)?;
        let before = group.clone();

        let member = group.add_member(name, role).map_err(|e| match e {
            crate::models::GroupValidationError::DuplicateMember(name) => SplitError::Duplicate {
                entity_type: "Member",
                identifier: name,
            },
            other => SplitError::Validation(other.to_string()),
        })?;
        let member = member.clone();

        self.storage.groups.upsert(group.clone())?;
        self.storage.groups.save()?;

        self.storage.log_update(
            EntityType::Group,
            group.id.to_string(),
            Some(group.name.clone()),
            &before,
            &group,
        )?;

        debug!(group = %group.id, member = %member.name, "added member");
        Ok(member)
    }

    /// Remove a member by name or ID
    ///
    /// Refused while the member appears in any expense or settlement of the
    /// group, so every recorded entry keeps pointing at a known member.
    pub fn remove_member(&self, group_id: GroupId, identifier: &str) -> SplitResult<Member> {
        let mut group = self.load(group_id)?;
        let before = group.clone();

        let member_id = group
            .find_member(identifier)
            .map(|m| m.id)
            .ok_or_else(|| SplitError::member_not_found(identifier))?;

        let expenses = self.storage.expenses.get_by_group(group_id)?;
        if let Some(expense) = expenses.iter().find(|e| e.involves(member_id)) {
            return Err(SplitError::Validation(format!(
                "Member takes part in expense '{}' and cannot be removed",
                expense.description
            )));
        }

        let settlements = self.storage.settlements.get_by_group(group_id)?;
        if settlements
            .iter()
            .any(|s| s.from == member_id || s.to == member_id)
        {
            return Err(SplitError::Validation(
                "Member has recorded settlements and cannot be removed".into(),
            ));
        }

        let member = group
            .remove_member(member_id)
            .ok_or_else(|| SplitError::member_not_found(identifier))?;

        self.storage.groups.upsert(group.clone())?;
        self.storage.groups.save()?;

        self.storage.log_update(
            EntityType::Group,
            group.id.to_string(),
            Some(group.name.clone()),
            &before,
            &group,
        )?;

        debug!(group = %group.id, member = %member.name, "removed member");
        Ok(member)
    }

    pub fn rename(&self, group_id: GroupId, new_name: &str) -> SplitResult<Group> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(SplitError::Validation("Group name cannot be empty".into()));
        }
        if self.storage.groups.name_exists(new_name, Some(group_id))? {
            return Err(SplitError::Duplicate {
                entity_type: "Group",
                identifier: new_name.to_string(),
            });
        }

        let mut group = self.load(group_id)?;
        let before = group.clone();
        group.name = new_name.to_string();
        group.updated_at = chrono::Utc::now();

        self.storage.groups.upsert(group.clone())?;
        self.storage.groups.save()?;

        self.storage.log_update(
            EntityType::Group,
            group.id.to_string(),
            Some(group.name.clone()),
            &before,
            &group,
        )?;

        Ok(group)
    }

    /// Delete a group together with its expenses and settlements
    pub fn delete(&self, group_id: GroupId) -> SplitResult<GroupDeletion> {
        let group = self.load(group_id)?;

        let expenses_removed = self.storage.expenses.delete_by_group(group_id)?;
        let settlements_removed = self.storage.settlements.delete_by_group(group_id)?;
        self.storage.groups.delete(group_id)?;
        self.storage.save_all()?;

        self.storage.log_delete(
            EntityType::Group,
            group.id.to_string(),
            Some(group.name.clone()),
            &group,
        )?;

        info!(
            group = %group.id,
            expenses_removed,
            settlements_removed,
            "deleted group"
        );

        Ok(GroupDeletion {
            expenses_removed,
            settlements_removed,
        })
    }

    fn load(&self, group_id: GroupId) -> SplitResult<Group> {
        self.storage
            .groups
            .get(group_id)?
            .ok_or_else(|| SplitError::group_not_found(group_id.to_string()))
    }
}
