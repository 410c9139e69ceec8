//! Group repository for JSON storage
//!
//! Groups are stored with their member lists in groups.json.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SplitError;
use crate::models::{Group, GroupId};

use super::file_io::{read_json, write_json_atomic};
use super::poisoned;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GroupData {
    groups: Vec<Group>,
}

pub struct GroupRepository {
    path: PathBuf,
    data: RwLock<HashMap<GroupId, Group>>,
}

impl GroupRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), SplitError> {
        let file_data: GroupData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(poisoned)?;
        data.clear();
        for group in file_data.groups {
            data.insert(group.id, group);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), SplitError> {
        let groups = self.get_all()?;
        write_json_atomic(&self.path, &GroupData { groups })
    }

    pub fn get(&self, id: GroupId) -> Result<Option<Group>, SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(&id).cloned())
    }

    /// All groups ordered by name
    pub fn get_all(&self) -> Result<Vec<Group>, SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        let mut groups: Vec<_> = data.values().cloned().collect();
        groups.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(groups)
    }

    /// Case-insensitive lookup by name
    pub fn get_by_name(&self, name: &str) -> Result<Option<Group>, SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        let name = name.trim();
        Ok(data
            .values()
            .find(|g| g.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    pub fn name_exists(&self, name: &str, exclude_id: Option<GroupId>) -> Result<bool, SplitError> {
        Ok(self
            .get_by_name(name)?
            .is_some_and(|g| Some(g.id) != exclude_id))
    }

    pub fn upsert(&self, group: Group) -> Result<(), SplitError> {
        let mut data = self.data.write().map_err(poisoned)?;
        data.insert(group.id, group);
        Ok(())
    }

    pub fn delete(&self, id: GroupId) -> Result<bool, SplitError> {
        let mut data = self.data.write().map_err(poisoned)?;
        Ok(data.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, SplitError> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRole;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, GroupRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = GroupRepository::new(temp_dir.path().join("groups.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_upsert_and_lookup() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let group = Group::new("Ski Trip", "EUR");
        let id = group.id;
        repo.upsert(group).unwrap();

        assert_eq!(repo.get(id).unwrap().unwrap().name, "Ski Trip");
        assert_eq!(repo.get_by_name("ski trip").unwrap().unwrap().id, id);
        assert!(repo.name_exists("SKI TRIP", None).unwrap());
        assert!(!repo.name_exists("Ski Trip", Some(id)).unwrap());
    }

    #[test]
    fn test_get_all_sorted_by_name() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Group::new("zoo", "USD")).unwrap();
        repo.upsert(Group::new("Apartment", "USD")).unwrap();

        let names: Vec<_> = repo.get_all().unwrap().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Apartment", "zoo"]);
    }

    #[test]
    fn test_save_and_reload_members() {
        let (temp_dir, repo) = create_test_repo();
        let mut group = Group::new("Flat", "USD");
        group.add_member("Alice", MemberRole::Admin).unwrap();
        group.add_member("Bob", MemberRole::Member).unwrap();
        let id = group.id;
        repo.upsert(group).unwrap();
        repo.save().unwrap();

        let repo2 = GroupRepository::new(temp_dir.path().join("groups.json"));
        repo2.load().unwrap();
        let loaded = repo2.get(id).unwrap().unwrap();
        assert_eq!(loaded.members.len(), 2);
        assert!(loaded.members[0].is_admin());
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let group = Group::new("Flat", "USD");
        let id = group.id;
        repo.upsert(group).unwrap();
        assert!(repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
