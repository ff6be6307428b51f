//! Persistence seam for groups and membership.
//!
//! # Data Flow
//! ```text
//! handlers (groups/handlers.rs)
//!     → GroupStore trait (this module)
//!     → memory.rs (reference implementation)
//!     ← seed.rs (initial users/groups from a TOML file)
//! ```
//!
//! # Design Decisions
//! - Handlers consume the store as Arc<dyn GroupStore>; swapping in a
//!   database-backed implementation never touches the HTTP layer
//! - Check-and-mutate operations (create, delete, add/remove members) are
//!   atomic inside the store so concurrent requests cannot interleave
//!   between the check and the mutation
//! - Bulk membership changes are all-or-nothing: the first offending user
//!   in request order fails the call and nothing is applied

pub mod memory;
pub mod seed;

use std::collections::BTreeSet;

use thiserror::Error;

use crate::groups::types::{Group, GroupId, RealmId, User, UserId};
use crate::http::response::ApiError;

/// Errors surfaced by store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No user with this ID exists in the given realm.
    #[error("no user {0} in realm")]
    UserNotFound(UserId),

    /// No user record carries this API key.
    #[error("unknown api key")]
    UnknownApiKey,

    /// No group with this ID exists in the given realm.
    #[error("no such group")]
    GroupNotFound,

    /// A group with this name already exists in the realm.
    #[error("group name '{0}' already taken")]
    DuplicateName(String),

    /// The user is already a direct member of the group.
    #[error("user {0} already a member")]
    AlreadyMember(UserId),

    /// The user is not a direct member of the group.
    #[error("user {0} not a member")]
    NotAMember(UserId),

    /// The store's lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound(id) => ApiError::InvalidUserId(id),
            StoreError::UnknownApiKey => ApiError::Unauthorized,
            StoreError::GroupNotFound => ApiError::GroupNotFound,
            StoreError::DuplicateName(name) => ApiError::DuplicateGroupName(name),
            StoreError::AlreadyMember(id) => ApiError::AlreadyMember(id),
            StoreError::NotAMember(id) => ApiError::NotAMember(id),
            StoreError::Poisoned => ApiError::Internal("store lock poisoned".to_string()),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Abstraction over group/membership persistence.
///
/// Every operation is scoped to a realm; records from other realms are
/// invisible, as if they did not exist.
pub trait GroupStore: Send + Sync {
    /// Resolve an API key to its user record, across realms.
    fn user_by_api_key(&self, api_key: &str) -> StoreResult<User>;

    /// Resolve user IDs to records within one realm.
    ///
    /// Duplicates are collapsed, first occurrence wins the position. Fails
    /// with [`StoreError::UserNotFound`] on the first ID that does not
    /// resolve, in request order.
    fn users_by_ids(&self, realm: RealmId, ids: &[UserId]) -> StoreResult<Vec<User>>;

    /// Create a group with its initial membership in one call.
    fn create_group(
        &self,
        realm: RealmId,
        name: &str,
        description: &str,
        members: &[UserId],
    ) -> StoreResult<GroupId>;

    /// All groups in the realm, ascending by ID.
    fn groups_in_realm(&self, realm: RealmId) -> StoreResult<Vec<Group>>;

    /// Fetch one group by ID.
    fn group_by_id(&self, realm: RealmId, id: GroupId) -> StoreResult<Group>;

    /// Change a group's name. The new name must be unused in the realm.
    fn rename_group(&self, realm: RealmId, id: GroupId, name: &str) -> StoreResult<()>;

    /// Change a group's description.
    fn update_group_description(
        &self,
        realm: RealmId,
        id: GroupId,
        description: &str,
    ) -> StoreResult<()>;

    /// Atomic check-and-delete of a group.
    fn delete_group(&self, realm: RealmId, id: GroupId) -> StoreResult<()>;

    /// The group's direct member IDs.
    fn direct_member_ids(&self, realm: RealmId, id: GroupId) -> StoreResult<BTreeSet<UserId>>;

    /// Add users to a group's direct membership, atomically.
    ///
    /// If any user is already a member, fails with
    /// [`StoreError::AlreadyMember`] naming the first offender in the given
    /// order, and no users are added.
    fn add_members(&self, realm: RealmId, id: GroupId, members: &[UserId]) -> StoreResult<()>;

    /// Remove users from a group's direct membership, atomically.
    ///
    /// If any user is not a member, fails with [`StoreError::NotAMember`]
    /// naming the first offender in the given order, and no users are
    /// removed.
    fn remove_members(&self, realm: RealmId, id: GroupId, members: &[UserId]) -> StoreResult<()>;
}
