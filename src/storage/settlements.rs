//! Settlement repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SplitError;
use crate::models::{GroupId, Settlement, SettlementId};

use super::file_io::{read_json, write_json_atomic};
use super::poisoned;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct SettlementData {
    settlements: Vec<Settlement>,
}

pub struct SettlementRepository {
    path: PathBuf,
    data: RwLock<HashMap<SettlementId, Settlement>>,
}

impl SettlementRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), SplitError> {
        let file_data: SettlementData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(poisoned)?;
        data.clear();
        for settlement in file_data.settlements {
            data.insert(settlement.id, settlement);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        let mut settlements: Vec<_> = data.values().cloned().collect();
        settlements.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        write_json_atomic(&self.path, &SettlementData { settlements })
    }

    /// Settlements of one group in date order
    pub fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Settlement>, SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        let mut settlements: Vec<_> = data
            .values()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect();
        settlements.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(settlements)
    }

    pub fn upsert(&self, settlement: Settlement) -> Result<(), SplitError> {
        let mut data = self.data.write().map_err(poisoned)?;
        data.insert(settlement.id, settlement);
        Ok(())
    }

    pub fn delete_by_group(&self, group_id: GroupId) -> Result<usize, SplitError> {
        let mut data = self.data.write().map_err(poisoned)?;
        let before = data.len();
        data.retain(|_, s| s.group_id != group_id);
        Ok(before - data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberId, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn settlement(group_id: GroupId, day: u32) -> Settlement {
        Settlement::new(
            group_id,
            MemberId::new(),
            MemberId::new(),
            Money::from_cents(1500),
            NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
        )
    }

    #[test]
    fn test_group_filter_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settlements.json");
        let repo = SettlementRepository::new(path.clone());
        let group = GroupId::new();

        repo.upsert(settlement(group, 9)).unwrap();
        repo.upsert(settlement(group, 2)).unwrap();
        repo.upsert(settlement(GroupId::new(), 5)).unwrap();
        repo.save().unwrap();

        let reloaded = SettlementRepository::new(path);
        reloaded.load().unwrap();
        let list = reloaded.get_by_group(group).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[0].date < list[1].date);

        assert_eq!(reloaded.delete_by_group(group).unwrap(), 2);
        assert!(reloaded.get_by_group(group).unwrap().is_empty());
    }
}
