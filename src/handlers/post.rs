// handlers/post.rs - /api/post/* handlers

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::{Comment, Like, Post, Tag};
use crate::middleware::{ApiResponse, ApiResult, Message, PathId, ValidJson};
use crate::services::post_service::{CommentRequest, CreatePostRequest, LikeRequest, UpdatePostRequest};

/// GET /api/post - every post, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Post>> {
    Ok(ApiResponse::success(state.posts.list_all().await?))
}

/// GET /api/post/type/:type
pub async fn list_by_type(State(state): State<AppState>, Path(post_type): Path<String>) -> ApiResult<Vec<Post>> {
    Ok(ApiResponse::success(state.posts.list_by_type(&post_type).await?))
}

/// GET /api/post/tags
pub async fn tags(State(state): State<AppState>) -> ApiResult<Vec<Tag>> {
    Ok(ApiResponse::success(state.posts.list_tags().await?))
}

/// GET /api/post/:id
pub async fn get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Post> {
    Ok(ApiResponse::success(state.posts.get(id).await?))
}

/// POST /api/post - create a post, resolving its tags
pub async fn create(State(state): State<AppState>, ValidJson(req): ValidJson<CreatePostRequest>) -> ApiResult<Post> {
    Ok(ApiResponse::created(state.posts.create(req).await?))
}

/// PATCH /api/post/:id - edit title and/or content
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<UpdatePostRequest>,
) -> ApiResult<Post> {
    Ok(ApiResponse::success(state.posts.update(id, req).await?))
}

/// DELETE /api/post/:id
pub async fn delete(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Message> {
    state.posts.delete(id).await?;
    Ok(ApiResponse::message("Post deleted"))
}

/// POST /api/post/:id/like
pub async fn like(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<LikeRequest>,
) -> ApiResult<Like> {
    Ok(ApiResponse::created(state.posts.like(id, req).await?))
}

/// POST /api/post/:id/unlike
pub async fn unlike(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<LikeRequest>,
) -> ApiResult<Message> {
    state.posts.unlike(id, req).await?;
    Ok(ApiResponse::message("Post unliked"))
}

/// GET /api/post/:id/likes
pub async fn likes(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Vec<Like>> {
    Ok(ApiResponse::success(state.posts.likes(id).await?))
}

/// GET /api/post/:id/comments
pub async fn comments(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Vec<Comment>> {
    Ok(ApiResponse::success(state.posts.comments(id).await?))
}

/// POST /api/post/:id/comments
pub async fn comment(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<CommentRequest>,
) -> ApiResult<Comment> {
    Ok(ApiResponse::created(state.posts.comment(id, req).await?))
}
