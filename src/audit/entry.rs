//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Group,
    Expense,
    Settlement,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Group => write!(f, "Group"),
            EntityType::Expense => write!(f, "Expense"),
            EntityType::Settlement => write!(f, "Settlement"),
        }
    }
}

/// A single audit log entry
///
/// `before` is set for updates and deletes, `after` for creates and updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: String,

    /// Human-readable description of the entity (group name, expense description)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    /// Top-level fields that changed in an update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_fields: Option<Vec<String>>,
}

impl AuditEntry {
    fn new(
        operation: Operation,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id,
            entity_name,
            before: None,
            after: None,
            changed_fields: None,
        }
    }

    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Create, entity_type, entity_id.into(), entity_name);
        entry.after = serde_json::to_value(entity).ok();
        entry
    }

    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Update, entity_type, entity_id.into(), entity_name);
        entry.before = serde_json::to_value(before).ok();
        entry.after = serde_json::to_value(after).ok();
        if let (Some(b), Some(a)) = (&entry.before, &entry.after) {
            let fields = changed_fields(b, a);
            if !fields.is_empty() {
                entry.changed_fields = Some(fields);
            }
        }
        entry
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Delete, entity_type, entity_id.into(), entity_name);
        entry.before = serde_json::to_value(entity).ok();
        entry
    }

    /// One-line summary, e.g. `2025-01-15 10:30:00 UTC CREATE Expense exp-1a2b3c4d (Dinner)`
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "{} {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(fields) = &self.changed_fields {
            output.push_str(&format!(" [{}]", fields.join(", ")));
        }

        output
    }
}

/// Names of top-level keys whose values differ between two JSON objects
fn changed_fields(before: &Value, after: &Value) -> Vec<String> {
    let (Value::Object(b), Value::Object(a)) = (before, after) else {
        return Vec::new();
    };

    let mut fields: Vec<String> = b
        .keys()
        .chain(a.keys())
        .filter(|k| *k != "updated_at" && b.get(*k) != a.get(*k))
        .cloned()
        .collect();
    fields.sort();
    fields.dedup();
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display() {
        assert_eq!(Operation::Update.to_string(), "UPDATE");
        assert_eq!(EntityType::Settlement.to_string(), "Settlement");
    }

    #[test]
    fn test_create_entry() {
        let entry = AuditEntry::create(
            EntityType::Group,
            "grp-12345678",
            Some("Flat".to_string()),
            &json!({"name": "Flat"}),
        );

        assert_eq!(entry.operation, Operation::Create);
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_update_records_changed_fields() {
        let before = json!({"description": "Taxi", "amount": 1000, "updated_at": "a"});
        let after = json!({"description": "Taxi", "amount": 1500, "notes": "airport", "updated_at": "b"});

        let entry = AuditEntry::update(EntityType::Expense, "exp-1", None, &before, &after);

        assert_eq!(
            entry.changed_fields,
            Some(vec!["amount".to_string(), "notes".to_string()])
        );
    }

    #[test]
    fn test_update_without_changes() {
        let value = json!({"name": "Flat"});
        let entry = AuditEntry::update(EntityType::Group, "grp-1", None, &value, &value);
        assert!(entry.changed_fields.is_none());
    }

    #[test]
    fn test_delete_entry() {
        let entry = AuditEntry::delete(EntityType::Expense, "exp-1", None, &json!({"amount": 5}));
        assert_eq!(entry.operation, Operation::Delete);
        assert!(entry.before.is_some());
        assert!(entry.after.is_none());
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::create(
            EntityType::Expense,
            "exp-12345678",
            Some("Dinner".to_string()),
            &json!({"description": "Dinner"}),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("CREATE Expense exp-12345678 (Dinner)"));
    }
}
