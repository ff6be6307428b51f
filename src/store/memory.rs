//! In-memory reference implementation of the store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use crate::groups::types::{Group, GroupId, RealmId, User, UserId};
use crate::store::{GroupStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<UserId, User>,
    groups: BTreeMap<GroupId, Group>,
    next_group_id: u64,
}

impl Inner {
    fn group_mut(&mut self, realm: RealmId, id: GroupId) -> StoreResult<&mut Group> {
        self.groups
            .get_mut(&id)
            .filter(|g| g.realm == realm)
            .ok_or(StoreError::GroupNotFound)
    }

    fn name_taken(&self, realm: RealmId, name: &str, exclude: Option<GroupId>) -> bool {
        self.groups
            .values()
            .any(|g| g.realm == realm && g.name == name && Some(g.id) != exclude)
    }
}

/// Group store backed by process memory.
///
/// A single `RwLock` guards all tables. Write operations hold the lock
/// across their existence/uniqueness checks and the mutation, which is what
/// makes check-and-mutate atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with user records.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut inner = Inner::default();
        for user in users {
            inner.users.insert(user.id, user);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }
}

impl GroupStore for MemoryStore {
    fn user_by_api_key(&self, api_key: &str) -> StoreResult<User> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        inner
            .users
            .values()
            .find(|u| u.api_key == api_key)
            .cloned()
            .ok_or(StoreError::UnknownApiKey)
    }

    fn users_by_ids(&self, realm: RealmId, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut seen = BTreeSet::new();
        let mut users = Vec::new();
        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            let user = inner
                .users
                .get(&id)
                .filter(|u| u.realm == realm)
                .ok_or(StoreError::UserNotFound(id))?;
            users.push(user.clone());
        }
        Ok(users)
    }

    fn create_group(
        &self,
        realm: RealmId,
        name: &str,
        description: &str,
        members: &[UserId],
    ) -> StoreResult<GroupId> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.name_taken(realm, name, None) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        inner.next_group_id += 1;
        let id = GroupId(inner.next_group_id);
        inner.groups.insert(
            id,
            Group {
                id,
                realm,
                name: name.to_string(),
                description: description.to_string(),
                members: members.iter().copied().collect(),
            },
        );
        Ok(id)
    }

    fn groups_in_realm(&self, realm: RealmId) -> StoreResult<Vec<Group>> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner
            .groups
            .values()
            .filter(|g| g.realm == realm)
            .cloned()
            .collect())
    }

    fn group_by_id(&self, realm: RealmId, id: GroupId) -> StoreResult<Group> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        inner
            .groups
            .get(&id)
            .filter(|g| g.realm == realm)
            .cloned()
            .ok_or(StoreError::GroupNotFound)
    }

    fn rename_group(&self, realm: RealmId, id: GroupId, name: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.name_taken(realm, name, Some(id)) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        let group = inner.group_mut(realm, id)?;
        group.name = name.to_string();
        Ok(())
    }

    fn update_group_description(
        &self,
        realm: RealmId,
        id: GroupId,
        description: &str,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let group = inner.group_mut(realm, id)?;
        group.description = description.to_string();
        Ok(())
    }

    fn delete_group(&self, realm: RealmId, id: GroupId) -> StoreResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        inner.group_mut(realm, id)?;
        inner.groups.remove(&id);
        Ok(())
    }

    fn direct_member_ids(&self, realm: RealmId, id: GroupId) -> StoreResult<BTreeSet<UserId>> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        inner
            .groups
            .get(&id)
            .filter(|g| g.realm == realm)
            .map(|g| g.members.clone())
            .ok_or(StoreError::GroupNotFound)
    }

    fn add_members(&self, realm: RealmId, id: GroupId, members: &[UserId]) -> StoreResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let group = inner.group_mut(realm, id)?;
        for &member in members {
            if group.members.contains(&member) {
                return Err(StoreError::AlreadyMember(member));
            }
        }
        group.members.extend(members.iter().copied());
        Ok(())
    }

    fn remove_members(&self, realm: RealmId, id: GroupId, members: &[UserId]) -> StoreResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let group = inner.group_mut(realm, id)?;
        for &member in members {
            if !group.members.contains(&member) {
                return Err(StoreError::NotAMember(member));
            }
        }
        for member in members {
            group.members.remove(member);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::types::Role;

    fn user(id: u64, realm: u64) -> User {
        User {
            id: UserId(id),
            realm: RealmId(realm),
            email: format!("user{id}@example.com"),
            api_key: format!("key-{id}"),
            role: Role::Member,
        }
    }

    fn store_with_users() -> MemoryStore {
        MemoryStore::with_users([user(1, 1), user(2, 1), user(3, 1), user(9, 2)])
    }

    #[test]
    fn test_create_and_fetch_group() {
        let store = store_with_users();
        let id = store
            .create_group(RealmId(1), "backend", "the backend team", &[UserId(1)])
            .unwrap();

        let group = store.group_by_id(RealmId(1), id).unwrap();
        assert_eq!(group.name, "backend");
        assert_eq!(group.description, "the backend team");
        assert!(group.members.contains(&UserId(1)));
    }

    #[test]
    fn test_duplicate_name_rejected_per_realm() {
        let store = store_with_users();
        store.create_group(RealmId(1), "ops", "", &[]).unwrap();

        let err = store.create_group(RealmId(1), "ops", "", &[]).unwrap_err();
        assert_eq!(err, StoreError::DuplicateName("ops".to_string()));

        // Same name in another realm is fine.
        store.create_group(RealmId(2), "ops", "", &[]).unwrap();
    }

    #[test]
    fn test_rename_checks_uniqueness() {
        let store = store_with_users();
        let a = store.create_group(RealmId(1), "a", "", &[]).unwrap();
        store.create_group(RealmId(1), "b", "", &[]).unwrap();

        let err = store.rename_group(RealmId(1), a, "b").unwrap_err();
        assert_eq!(err, StoreError::DuplicateName("b".to_string()));

        // Renaming to its own current name is not a conflict.
        store.rename_group(RealmId(1), a, "a").unwrap();
    }

    #[test]
    fn test_users_by_ids_dedupes_and_scopes() {
        let store = store_with_users();

        let users = store
            .users_by_ids(RealmId(1), &[UserId(2), UserId(1), UserId(2)])
            .unwrap();
        let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![UserId(2), UserId(1)]);

        // User 9 lives in realm 2, invisible from realm 1.
        let err = store
            .users_by_ids(RealmId(1), &[UserId(1), UserId(9)])
            .unwrap_err();
        assert_eq!(err, StoreError::UserNotFound(UserId(9)));
    }

    #[test]
    fn test_add_members_first_offender_aborts_whole_call() {
        let store = store_with_users();
        let id = store
            .create_group(RealmId(1), "g", "", &[UserId(1)])
            .unwrap();

        let err = store
            .add_members(RealmId(1), id, &[UserId(1), UserId(2)])
            .unwrap_err();
        assert_eq!(err, StoreError::AlreadyMember(UserId(1)));

        // User 2 must not have been added.
        let members = store.direct_member_ids(RealmId(1), id).unwrap();
        assert!(!members.contains(&UserId(2)));
    }

    #[test]
    fn test_remove_members_first_offender_aborts_whole_call() {
        let store = store_with_users();
        let id = store
            .create_group(RealmId(1), "g", "", &[UserId(1), UserId(2)])
            .unwrap();

        let err = store
            .remove_members(RealmId(1), id, &[UserId(3), UserId(1)])
            .unwrap_err();
        assert_eq!(err, StoreError::NotAMember(UserId(3)));

        // User 1 must still be a member.
        let members = store.direct_member_ids(RealmId(1), id).unwrap();
        assert!(members.contains(&UserId(1)));
    }

    #[test]
    fn test_delete_group_scoped_to_realm() {
        let store = store_with_users();
        let id = store.create_group(RealmId(1), "g", "", &[]).unwrap();

        assert_eq!(
            store.delete_group(RealmId(2), id).unwrap_err(),
            StoreError::GroupNotFound
        );
        store.delete_group(RealmId(1), id).unwrap();
        assert_eq!(
            store.group_by_id(RealmId(1), id).unwrap_err(),
            StoreError::GroupNotFound
        );
    }

    #[test]
    fn test_listing_ordered_by_id() {
        let store = store_with_users();
        store.create_group(RealmId(1), "z", "", &[]).unwrap();
        store.create_group(RealmId(1), "a", "", &[]).unwrap();
        store.create_group(RealmId(2), "m", "", &[]).unwrap();

        let groups = store.groups_in_realm(RealmId(1)).unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert!(groups.windows(2).all(|w| w[0].id < w[1].id));
    }
}
