//! Authorization guards.
//!
//! # Responsibilities
//! - Resolve the Authorization header to a caller identity
//! - Enforce role policy for read and edit operations
//!
//! # Design Decisions
//! - Guards are plain functions called at the top of each handler, never
//!   implicit middleware; a handler's permission requirements are visible
//!   at its call site
//! - API keys are per-user records in the store, not a shared secret

use axum::http::HeaderMap;

use crate::config::EditPolicy;
use crate::groups::types::{RealmId, Role, UserId};
use crate::http::response::{ApiError, ApiResult};
use crate::store::GroupStore;

/// The authenticated user a request executes on behalf of.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: UserId,
    pub realm: RealmId,
    pub role: Role,
}

/// Resolve the `Authorization: Bearer <api key>` header to a caller.
pub fn authenticate(store: &dyn GroupStore, headers: &HeaderMap) -> ApiResult<Caller> {
    let key = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let user = store
        .user_by_api_key(key)
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Caller {
        user_id: user.id,
        realm: user.realm,
        role: user.role,
    })
}

/// Guard for read operations: any member or administrator.
pub fn require_member_or_admin(caller: &Caller) -> ApiResult<()> {
    match caller.role {
        Role::Admin | Role::Member => Ok(()),
        Role::Guest => Err(ApiError::Forbidden),
    }
}

/// Guard for group create/edit/delete/membership operations.
pub fn require_group_edit_permission(caller: &Caller, policy: EditPolicy) -> ApiResult<()> {
    match (caller.role, policy) {
        (Role::Admin, _) => Ok(()),
        (Role::Member, EditPolicy::Members) => Ok(()),
        (Role::Member, EditPolicy::Admins) => Err(ApiError::Forbidden),
        (Role::Guest, _) => Err(ApiError::Forbidden),
    }
}
