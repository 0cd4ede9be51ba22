// handlers/group.rs - /api/group/* handlers
//
// Mutations other than join/leave are creator-gated in GroupService.

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::{Group, GroupDetail, GroupMember, GroupUser};
use crate::middleware::{ApiResponse, ApiResult, Message, PathId, ValidJson, ValidQuery};
use crate::services::group_service::{
    AdminsQuery, CreateGroupRequest, DeleteGroupRequest, EditGroupRequest, MemberActionRequest,
    MembershipRequest,
};

/// GET /api/group
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Group>> {
    Ok(ApiResponse::success(state.groups.list_all().await?))
}

/// POST /api/group/create
pub async fn create(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateGroupRequest>,
) -> ApiResult<GroupDetail> {
    Ok(ApiResponse::created(state.groups.create(req).await?))
}

/// GET /api/group/:id - group with creator and member rows
pub async fn get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<GroupDetail> {
    Ok(ApiResponse::success(state.groups.get(id).await?))
}

/// GET /api/group/:id/admins?page=N
pub async fn admins(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidQuery(query): ValidQuery<AdminsQuery>,
) -> ApiResult<Vec<GroupMember>> {
    Ok(ApiResponse::success(state.groups.list_admins(id, query).await?))
}

/// PATCH /api/group/:id/add-admin
pub async fn add_admin(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<MemberActionRequest>,
) -> ApiResult<GroupUser> {
    Ok(ApiResponse::success(state.groups.add_admin(id, req).await?))
}

/// PATCH /api/group/:id/remove-admin
pub async fn remove_admin(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<MemberActionRequest>,
) -> ApiResult<GroupUser> {
    Ok(ApiResponse::success(state.groups.remove_admin(id, req).await?))
}

/// PATCH /api/group/:id
pub async fn edit(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<EditGroupRequest>,
) -> ApiResult<Group> {
    Ok(ApiResponse::success(state.groups.edit(id, req).await?))
}

/// POST /api/group/:id/join
pub async fn join(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<MembershipRequest>,
) -> ApiResult<GroupUser> {
    Ok(ApiResponse::created(state.groups.join(id, req).await?))
}

/// DELETE /api/group/:id/leave
pub async fn leave(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<MembershipRequest>,
) -> ApiResult<Message> {
    state.groups.leave(id, req).await?;
    Ok(ApiResponse::message("Left group"))
}

/// DELETE /api/group/:id/remove
pub async fn remove_member(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<MemberActionRequest>,
) -> ApiResult<Message> {
    state.groups.remove_member(id, req).await?;
    Ok(ApiResponse::message("Member removed"))
}

/// DELETE /api/group/:id
pub async fn delete(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<DeleteGroupRequest>,
) -> ApiResult<Message> {
    state.groups.delete(id, req).await?;
    Ok(ApiResponse::message("Group deleted"))
}
