//! JSON export of a whole group with schema versioning

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SplitError, SplitResult};
use crate::ledger::{member_balances, MemberBalance};
use crate::models::{Expense, Group, GroupId, Settlement};
use crate::storage::Storage;

pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// A group with everything recorded against it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub group: Group,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
    /// Net balances at export time
    pub balances: Vec<MemberBalance>,
}

impl GroupExport {
    pub fn from_storage(storage: &Storage, group_id: GroupId) -> SplitResult<Self> {
        let group = storage
            .groups
            .get(group_id)?
            .ok_or_else(|| SplitError::group_not_found(group_id.to_string()))?;
        let expenses = storage.expenses.get_by_group(group_id)?;
        let settlements = storage.settlements.get_by_group(group_id)?;
        let balances = member_balances(&group.members, &expenses, &settlements);

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            group,
            expenses,
            settlements,
            balances,
        })
    }
}

/// Write a pretty-printed JSON export of one group
pub fn export_group_json<W: Write>(
    storage: &Storage,
    group_id: GroupId,
    writer: &mut W,
) -> SplitResult<()> {
    let export = GroupExport::from_storage(storage, group_id)?;
    serde_json::to_writer_pretty(&mut *writer, &export)
        .map_err(|e| SplitError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| SplitError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::services::GroupService;
    use tempfile::TempDir;

    #[test]
    fn test_export_group_json() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        let group = GroupService::new(&storage)
            .create("Flat", "USD", Some("Alice"))
            .unwrap();

        let mut output = Vec::new();
        export_group_json(&storage, group.id, &mut output).unwrap();

        let parsed: GroupExport = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(parsed.group.name, "Flat");
        assert_eq!(parsed.balances.len(), 1);
        assert!(parsed.expenses.is_empty());
    }
}
