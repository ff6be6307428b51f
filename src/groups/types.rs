//! Domain types for realms, users, and user groups.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::http::response::ApiError;

/// Realm (workspace) ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RealmId(pub u64);

/// User ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Group ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Role of a user within its realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
    Guest,
}

/// A user record. Read-only from this service's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub realm: RealmId,
    pub email: String,
    pub api_key: String,
    pub role: Role,
}

/// A group record with its direct membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub realm: RealmId,
    pub name: String,
    pub description: String,
    /// Direct members, kept sorted so serialized listings are deterministic.
    pub members: BTreeSet<UserId>,
}

/// Serialized form of a group as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOut {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub members: Vec<UserId>,
}

impl From<&Group> for GroupOut {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            description: group.description.clone(),
            members: group.members.iter().copied().collect(),
        }
    }
}

/// Body of `POST /groups`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub members: Vec<UserId>,
}

impl CreateGroupRequest {
    /// Check field-level constraints before any handler logic runs.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Group name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Body of `PATCH /groups/{id}`. Absent fields deserialize as empty,
/// meaning "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditGroupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl EditGroupRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.is_empty() && self.description.is_empty() {
            return Err(ApiError::NoNewData);
        }
        Ok(())
    }
}

/// Body of `POST /groups/{id}/members`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMembersRequest {
    #[serde(default)]
    pub add: Vec<UserId>,
    #[serde(default)]
    pub delete: Vec<UserId>,
}

impl UpdateMembersRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.add.is_empty() && self.delete.is_empty() {
            return Err(ApiError::NothingToDo);
        }
        Ok(())
    }
}
