//! Request handlers for the group endpoints.
//!
//! Every handler follows the same linear pipeline: authorize the caller,
//! validate the parsed input, call the store, serialize the response.
//! There is no handler-local state and no retry logic; any failure aborts
//! the request with an error envelope.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::auth::{authenticate, require_group_edit_permission, require_member_or_admin};
use crate::groups::compose::{compose_results, SubOp};
use crate::groups::types::{
    CreateGroupRequest, EditGroupRequest, GroupId, GroupOut, RealmId, UpdateMembersRequest, UserId,
};
use crate::http::request::JsonBody;
use crate::http::response::{empty_success, ApiResult, ResponseData};
use crate::http::server::AppState;
use crate::store::GroupStore;

/// `POST /groups`: create a group with its initial membership.
pub async fn create_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<CreateGroupRequest>,
) -> ApiResult<Json<ResponseData>> {
    let caller = authenticate(state.store.as_ref(), &headers)?;
    require_group_edit_permission(&caller, state.edit_policy)?;
    body.validate()?;

    let users = state.store.users_by_ids(caller.realm, &body.members)?;
    let member_ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
    let id = state.store.create_group(
        caller.realm,
        body.name.trim(),
        &body.description,
        &member_ids,
    )?;

    tracing::info!(
        group_id = %id,
        realm = caller.realm.0,
        members = member_ids.len(),
        "Group created"
    );
    Ok(Json(empty_success()))
}

#[derive(Serialize)]
pub struct GroupListResponse {
    pub user_groups: Vec<GroupOut>,
}

/// `GET /groups`: every group in the caller's realm.
pub async fn list_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<GroupListResponse>> {
    let caller = authenticate(state.store.as_ref(), &headers)?;
    require_member_or_admin(&caller)?;

    let groups = state.store.groups_in_realm(caller.realm)?;
    let user_groups = groups.iter().map(GroupOut::from).collect();
    Ok(Json(GroupListResponse { user_groups }))
}

/// `PATCH /groups/{id}`: rename and/or redescribe a group.
///
/// An empty field means "leave unchanged"; a field equal to the current
/// value is skipped, so repeating an edit is idempotent.
pub async fn edit_group(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<EditGroupRequest>,
) -> ApiResult<Json<ResponseData>> {
    let caller = authenticate(state.store.as_ref(), &headers)?;
    require_group_edit_permission(&caller, state.edit_policy)?;
    body.validate()?;

    let group_id = GroupId(id);
    let group = state.store.group_by_id(caller.realm, group_id)?;

    if !body.name.is_empty() && body.name != group.name {
        state.store.rename_group(caller.realm, group_id, &body.name)?;
        tracing::info!(group_id = %group_id, "Group renamed");
    }

    if !body.description.is_empty() && body.description != group.description {
        state
            .store
            .update_group_description(caller.realm, group_id, &body.description)?;
        tracing::debug!(group_id = %group_id, "Group description updated");
    }

    Ok(Json(empty_success()))
}

/// `DELETE /groups/{id}`: check-and-delete a group.
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<Json<ResponseData>> {
    let caller = authenticate(state.store.as_ref(), &headers)?;
    require_group_edit_permission(&caller, state.edit_policy)?;

    state.store.delete_group(caller.realm, GroupId(id))?;
    tracing::info!(group_id = id, realm = caller.realm.0, "Group deleted");
    Ok(Json(empty_success()))
}

/// `POST /groups/{id}/members`: combined add + remove.
///
/// The add and remove sub-operations run in order through
/// [`compose_results`]; the first failure aborts the request. A mutation
/// already applied by the add sub-operation stands even when the remove
/// sub-operation fails.
pub async fn update_members(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<UpdateMembersRequest>,
) -> ApiResult<Json<ResponseData>> {
    let caller = authenticate(state.store.as_ref(), &headers)?;
    require_group_edit_permission(&caller, state.edit_policy)?;
    body.validate()?;

    let store = state.store.as_ref();
    let group_id = GroupId(id);
    let realm = caller.realm;
    let UpdateMembersRequest { add, delete } = body;

    let ops: Vec<SubOp> = vec![
        Box::new(move || add_members(store, realm, group_id, &add)),
        Box::new(move || remove_members(store, realm, group_id, &delete)),
    ];
    let data = compose_results(ops)?;

    Ok(Json(data))
}

/// Add sub-operation. An empty list is a no-op success.
fn add_members(
    store: &dyn GroupStore,
    realm: RealmId,
    group_id: GroupId,
    members: &[UserId],
) -> ApiResult<ResponseData> {
    if members.is_empty() {
        return Ok(empty_success());
    }

    store.group_by_id(realm, group_id)?;
    let users = store.users_by_ids(realm, members)?;
    let user_ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
    store.add_members(realm, group_id, &user_ids)?;

    tracing::info!(group_id = %group_id, added = user_ids.len(), "Members added");
    Ok(empty_success())
}

/// Remove sub-operation. An empty list is a no-op success.
fn remove_members(
    store: &dyn GroupStore,
    realm: RealmId,
    group_id: GroupId,
    members: &[UserId],
) -> ApiResult<ResponseData> {
    if members.is_empty() {
        return Ok(empty_success());
    }

    let users = store.users_by_ids(realm, members)?;
    store.group_by_id(realm, group_id)?;
    let user_ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
    store.remove_members(realm, group_id, &user_ids)?;

    tracing::info!(group_id = %group_id, removed = user_ids.len(), "Members removed");
    Ok(empty_success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::types::{Role, User};
    use crate::http::response::ApiError;
    use crate::store::memory::MemoryStore;

    fn user(id: u64) -> User {
        User {
            id: UserId(id),
            realm: RealmId(1),
            email: format!("user{id}@example.com"),
            api_key: format!("key-{id}"),
            role: Role::Member,
        }
    }

    #[test]
    fn test_add_sub_op_empty_is_noop_success() {
        let store = MemoryStore::new();
        let data = add_members(&store, RealmId(1), GroupId(1), &[]).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_add_sub_op_first_offender() {
        let store = MemoryStore::with_users([user(5), user(6)]);
        let id = store
            .create_group(RealmId(1), "g", "", &[UserId(5)])
            .unwrap();

        let err = add_members(&store, RealmId(1), id, &[UserId(5), UserId(6)]).unwrap_err();
        assert_eq!(err, ApiError::AlreadyMember(UserId(5)));

        // 6 was after the offender and must not have been added.
        let members = store.direct_member_ids(RealmId(1), id).unwrap();
        assert!(!members.contains(&UserId(6)));
    }

    #[test]
    fn test_remove_sub_op_unknown_member() {
        let store = MemoryStore::with_users([user(5), user(6)]);
        let id = store
            .create_group(RealmId(1), "g", "", &[UserId(5)])
            .unwrap();

        let err = remove_members(&store, RealmId(1), id, &[UserId(6)]).unwrap_err();
        assert_eq!(err, ApiError::NotAMember(UserId(6)));

        let members = store.direct_member_ids(RealmId(1), id).unwrap();
        assert!(members.contains(&UserId(5)));
    }

    #[test]
    fn test_add_sub_op_resolves_users_before_membership() {
        let store = MemoryStore::with_users([user(5)]);
        let id = store.create_group(RealmId(1), "g", "", &[]).unwrap();

        // 42 does not exist; the call fails before any mutation.
        let err = add_members(&store, RealmId(1), id, &[UserId(5), UserId(42)]).unwrap_err();
        assert_eq!(err, ApiError::InvalidUserId(UserId(42)));
        assert!(store.direct_member_ids(RealmId(1), id).unwrap().is_empty());
    }
}
