// handlers/user.rs - /api/user/* handlers

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::{Follow, Profile, ProfileChanges, UserSummary, UserWithProfile};
use crate::middleware::{ApiResponse, ApiResult, Message, PathId, ValidJson};
use crate::services::user_service::{DeleteUserRequest, FollowRequest};

/// GET /api/user/:id
pub async fn get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<UserWithProfile> {
    Ok(ApiResponse::success(state.users.get_user(id).await?))
}

/// PATCH /api/user/:id/profile
pub async fn update_profile(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(changes): ValidJson<ProfileChanges>,
) -> ApiResult<Profile> {
    Ok(ApiResponse::success(state.users.update_profile(id, changes).await?))
}

/// DELETE /api/user/:id
pub async fn delete(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<DeleteUserRequest>,
) -> ApiResult<Message> {
    state.users.delete_user(id, req).await?;
    Ok(ApiResponse::message("User deleted"))
}

/// POST /api/user/:id/follow - `followerId` starts following `:id`
pub async fn follow(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<FollowRequest>,
) -> ApiResult<Follow> {
    Ok(ApiResponse::created(state.users.follow(id, req).await?))
}

/// POST /api/user/:id/unfollow
pub async fn unfollow(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<FollowRequest>,
) -> ApiResult<Message> {
    state.users.unfollow(id, req).await?;
    Ok(ApiResponse::message("Unfollowed user"))
}

/// GET /api/user/:id/followers
pub async fn followers(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Vec<UserSummary>> {
    Ok(ApiResponse::success(state.users.followers(id).await?))
}

/// GET /api/user/:id/following
pub async fn following(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Vec<UserSummary>> {
    Ok(ApiResponse::success(state.users.following(id).await?))
}
