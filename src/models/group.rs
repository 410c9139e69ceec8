//! Group and member models
//!
//! A group is the unit expenses are shared within. Every group has a currency
//! and a list of members, at least one of whom is an admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{GroupId, MemberId};
use super::money::is_valid_currency_code;

/// Role of a member within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    #[default]
    Member,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
        }
    }
}

/// A participant in a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(name: impl Into<String>, role: MemberRole) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            role,
            joined_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

/// A group of people sharing expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub currency: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<MemberId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: impl Into<String>, currency: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::new(),
            name: name.into(),
            currency: currency.into(),
            members: Vec::new(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a member, rejecting names already present (case-insensitive)
    pub fn add_member(
        &mut self,
        name: impl Into<String>,
        role: MemberRole,
    ) -> Result<&Member, GroupValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(GroupValidationError::EmptyMemberName);
        }
        if self.member_by_name(&name).is_some() {
            return Err(GroupValidationError::DuplicateMember(name));
        }

        self.members.push(Member::new(name, role));
        self.updated_at = Utc::now();
        let index = self.members.len() - 1;
        Ok(&self.members[index])
    }

    /// Remove a member, returning it if present
    pub fn remove_member(&mut self, member_id: MemberId) -> Option<Member> {
        let index = self.members.iter().position(|m| m.id == member_id)?;
        self.updated_at = Utc::now();
        Some(self.members.remove(index))
    }

    pub fn member(&self, member_id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    pub fn member_by_name(&self, name: &str) -> Option<&Member> {
        let name = name.trim();
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Find a member by name or by ID string
    pub fn find_member(&self, identifier: &str) -> Option<&Member> {
        if let Some(member) = self.member_by_name(identifier) {
            return Some(member);
        }
        let id = identifier.parse::<MemberId>().ok()?;
        self.member(id)
    }

    pub fn is_member(&self, member_id: MemberId) -> bool {
        self.member(member_id).is_some()
    }

    pub fn admins(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_admin())
    }

    pub fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn validate(&self) -> Result<(), GroupValidationError> {
        if self.name.trim().is_empty() {
            return Err(GroupValidationError::EmptyName);
        }
        if !is_valid_currency_code(&self.currency) {
            return Err(GroupValidationError::InvalidCurrency(self.currency.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} members)",
            self.name,
            self.currency,
            self.members.len()
        )
    }
}

/// Validation errors for groups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupValidationError {
    #[error("Group name cannot be empty")]
    EmptyName,

    #[error("Invalid currency code '{0}'")]
    InvalidCurrency(String),

    #[error("Member name cannot be empty")]
    EmptyMemberName,

    #[error("Member '{0}' is already in the group")]
    DuplicateMember(String),
}
