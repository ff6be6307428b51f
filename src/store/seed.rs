//! Seed file loading for the in-memory store.
//!
//! The seed is a TOML document declaring user records and, optionally,
//! initial groups:
//!
//! ```toml
//! [[users]]
//! id = 1
//! realm = 1
//! email = "iago@example.com"
//! api_key = "iago-api-key"
//! role = "admin"
//!
//! [[groups]]
//! realm = 1
//! name = "backend"
//! description = "Backend team"
//! members = [1]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::groups::types::{RealmId, Role, User, UserId};
use crate::store::memory::MemoryStore;
use crate::store::{GroupStore, StoreError};

/// Error type for seed loading.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Reading the seed file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the seed schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two user entries share an ID.
    #[error("duplicate user id {0}")]
    DuplicateUserId(u64),

    /// Two user entries share an API key.
    #[error("duplicate api key for users {0} and {1}")]
    DuplicateApiKey(u64, u64),

    /// A group references a user that is not seeded in its realm.
    #[error("group '{group}' references unknown user {user} in realm {realm}")]
    UnknownMember { group: String, user: u64, realm: u64 },

    /// Two groups in one realm share a name.
    #[error("duplicate group name '{0}'")]
    DuplicateGroupName(String),

    /// The store rejected a seeded record.
    #[error("store error: {0}")]
    Store(StoreError),
}

#[derive(Debug, Deserialize)]
struct SeedUser {
    id: u64,
    realm: u64,
    email: String,
    api_key: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct SeedGroup {
    realm: u64,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    members: Vec<u64>,
}

/// Parsed seed document.
#[derive(Debug, Deserialize)]
pub struct Seed {
    #[serde(default)]
    users: Vec<SeedUser>,
    #[serde(default)]
    groups: Vec<SeedGroup>,
}

impl Seed {
    /// Parse a seed document from TOML text.
    pub fn parse(content: &str) -> Result<Self, SeedError> {
        Ok(toml::from_str(content)?)
    }

    /// Build a populated store, checking referential integrity.
    pub fn into_store(self) -> Result<MemoryStore, SeedError> {
        let mut all_ids: BTreeSet<u64> = BTreeSet::new();
        let mut by_key: BTreeMap<&str, u64> = BTreeMap::new();
        let mut realm_users: BTreeMap<u64, BTreeSet<u64>> = BTreeMap::new();
        let mut users = Vec::with_capacity(self.users.len());

        for seeded in &self.users {
            if !all_ids.insert(seeded.id) {
                return Err(SeedError::DuplicateUserId(seeded.id));
            }
            realm_users.entry(seeded.realm).or_default().insert(seeded.id);
            if let Some(&other) = by_key.get(seeded.api_key.as_str()) {
                return Err(SeedError::DuplicateApiKey(other, seeded.id));
            }
            by_key.insert(&seeded.api_key, seeded.id);
            users.push(User {
                id: UserId(seeded.id),
                realm: RealmId(seeded.realm),
                email: seeded.email.clone(),
                api_key: seeded.api_key.clone(),
                role: seeded.role,
            });
        }

        let store = MemoryStore::with_users(users);

        for group in &self.groups {
            let known = realm_users.get(&group.realm);
            for &member in &group.members {
                if !known.is_some_and(|ids| ids.contains(&member)) {
                    return Err(SeedError::UnknownMember {
                        group: group.name.clone(),
                        user: member,
                        realm: group.realm,
                    });
                }
            }
            let members: Vec<UserId> = group.members.iter().map(|&id| UserId(id)).collect();
            store
                .create_group(
                    RealmId(group.realm),
                    &group.name,
                    &group.description,
                    &members,
                )
                .map_err(|err| match err {
                    StoreError::DuplicateName(name) => SeedError::DuplicateGroupName(name),
                    other => SeedError::Store(other),
                })?;
        }

        Ok(store)
    }
}

/// Load a seed file and build a store from it.
pub fn load_store(path: &Path) -> Result<MemoryStore, SeedError> {
    let content = fs::read_to_string(path)?;
    Seed::parse(&content)?.into_store()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"
        [[users]]
        id = 1
        realm = 1
        email = "iago@example.com"
        api_key = "iago-key"
        role = "admin"

        [[users]]
        id = 2
        realm = 1
        email = "hamlet@example.com"
        api_key = "hamlet-key"
        role = "member"

        [[groups]]
        realm = 1
        name = "backend"
        description = "Backend team"
        members = [1, 2]
    "#;

    #[test]
    fn test_seed_round_trip() {
        let store = Seed::parse(SEED).unwrap().into_store().unwrap();

        let caller = store.user_by_api_key("iago-key").unwrap();
        assert_eq!(caller.id, UserId(1));
        assert_eq!(caller.role, Role::Admin);

        let groups = store.groups_in_realm(RealmId(1)).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "backend");
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn test_unknown_member_rejected() {
        let seed = r#"
            [[users]]
            id = 1
            realm = 1
            email = "a@example.com"
            api_key = "a"
            role = "member"

            [[groups]]
            realm = 1
            name = "g"
            members = [1, 42]
        "#;
        let err = Seed::parse(seed).unwrap().into_store().unwrap_err();
        assert!(matches!(err, SeedError::UnknownMember { user: 42, .. }));
    }

    #[test]
    fn test_duplicate_api_key_rejected() {
        let seed = r#"
            [[users]]
            id = 1
            realm = 1
            email = "a@example.com"
            api_key = "same"
            role = "member"

            [[users]]
            id = 2
            realm = 1
            email = "b@example.com"
            api_key = "same"
            role = "member"
        "#;
        let err = Seed::parse(seed).unwrap().into_store().unwrap_err();
        assert!(matches!(err, SeedError::DuplicateApiKey(1, 2)));
    }

    #[test]
    fn test_load_store_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.toml");
        fs::write(&path, SEED).unwrap();

        let store = load_store(&path).unwrap();
        assert!(store.user_by_api_key("hamlet-key").is_ok());
    }
}
