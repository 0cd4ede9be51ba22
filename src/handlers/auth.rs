// handlers/auth.rs - /api/auth/* handlers

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::{User, UserWithProfile};
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::services::auth_service::{LoginRequest, RegisterRequest, SocialRegisterRequest, UserLookupRequest};

/// POST /api/auth/register - create a local account
pub async fn register(State(state): State<AppState>, ValidJson(req): ValidJson<RegisterRequest>) -> ApiResult<User> {
    let user = state.auth.register(req).await?;
    Ok(ApiResponse::created(user))
}

/// POST /api/auth/register/social - create an account without a password
pub async fn register_social(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SocialRegisterRequest>,
) -> ApiResult<User> {
    let user = state.auth.register_social(req).await?;
    Ok(ApiResponse::created(user))
}

/// POST /api/auth/login - verify credentials and return the user record
pub async fn login(State(state): State<AppState>, ValidJson(req): ValidJson<LoginRequest>) -> ApiResult<User> {
    let user = state.auth.login(req).await?;
    Ok(ApiResponse::success(user))
}

/// POST /api/auth/user - user and profile by email
pub async fn user(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<UserLookupRequest>,
) -> ApiResult<UserWithProfile> {
    let user = state.auth.get_user_by_email(req).await?;
    Ok(ApiResponse::success(user))
}
