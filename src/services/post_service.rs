use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Comment, Like, NewComment, NewPost, Post, PostChanges, PostType, Tag};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;
use crate::middleware::validate::validate_required;
use crate::middleware::{FieldErrors, Validate};

const MAX_TITLE_CHARS: usize = 200;
const MAX_TAG_CHARS: usize = 50;
const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub author_id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub content: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub meetup_date: Option<DateTime<Utc>>,
    pub meetup_location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Validate for CreatePostRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.check("title", validate_required(&self.title, "Title", MAX_TITLE_CHARS));
        for tag in &self.tags {
            errors.check("tags", validate_required(tag.trim(), "Tag name", MAX_TAG_CHARS));
        }
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Validate for UpdatePostRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.title.is_none() && self.content.is_none() {
            return Err(ApiError::bad_request("Nothing to update; supply title or content"));
        }
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            errors.check("title", validate_required(title, "Title", MAX_TITLE_CHARS));
        }
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub user_id: Uuid,
}

impl Validate for LikeRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub author_id: Uuid,
    pub content: String,
}

impl Validate for CommentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.check("content", validate_required(&self.content, "Comment", MAX_COMMENT_CHARS));
        errors.into_result()
    }
}

/// Trim tag names and drop repeats, keeping first-seen order
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

fn post_not_found(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::NotFound(_) => ApiError::not_found("Post not found"),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn Store>,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> Result<Vec<Post>, ApiError> {
        Ok(self.store.list_posts(None).await?)
    }

    /// `post_type` is matched case-insensitively against the fixed set
    pub async fn list_by_type(&self, post_type: &str) -> Result<Vec<Post>, ApiError> {
        let post_type: PostType = post_type.parse().map_err(ApiError::bad_request)?;
        Ok(self.store.list_posts(Some(post_type)).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, ApiError> {
        self.store
            .find_post(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Post not found"))
    }

    pub async fn create(&self, req: CreatePostRequest) -> Result<Post, ApiError> {
        let new_post = NewPost {
            author_id: req.author_id,
            group_id: req.group_id,
            post_type: req.post_type,
            title: req.title.trim().to_string(),
            content: req.content,
            image_url: req.image_url,
            video_url: req.video_url,
            meetup_date: req.meetup_date,
            meetup_location: req.meetup_location,
            tags: normalize_tags(req.tags),
        };

        let post = self.store.create_post(new_post).await.map_err(|e| match e {
            DatabaseError::ForeignKeyViolation(_) => ApiError::not_found("Author or group not found"),
            other => other.into(),
        })?;
        info!("Created {} post {} with {} tags", post.post_type, post.id, post.tags.len());
        Ok(post)
    }

    pub async fn update(&self, id: Uuid, req: UpdatePostRequest) -> Result<Post, ApiError> {
        let changes = PostChanges {
            title: req.title.map(|t| t.trim().to_string()),
            content: req.content,
        };
        self.store.update_post(id, changes).await.map_err(post_not_found)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.store.delete_post(id).await.map_err(post_not_found)?;
        info!("Deleted post {}", id);
        Ok(())
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        Ok(self.store.list_tags().await?)
    }

    pub async fn like(&self, post_id: Uuid, req: LikeRequest) -> Result<Like, ApiError> {
        self.store
            .create_like(post_id, req.user_id)
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => ApiError::conflict("Post already liked"),
                DatabaseError::ForeignKeyViolation(_) => ApiError::not_found("User or post not found"),
                other => other.into(),
            })
    }

    pub async fn unlike(&self, post_id: Uuid, req: LikeRequest) -> Result<(), ApiError> {
        self.store
            .delete_like(post_id, req.user_id)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => ApiError::not_found("Like not found"),
                other => other.into(),
            })
    }

    pub async fn likes(&self, post_id: Uuid) -> Result<Vec<Like>, ApiError> {
        self.get(post_id).await?;
        Ok(self.store.list_likes(post_id).await?)
    }

    pub async fn comment(&self, post_id: Uuid, req: CommentRequest) -> Result<Comment, ApiError> {
        self.store
            .create_comment(NewComment {
                author_id: req.author_id,
                post_id,
                content: req.content,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::ForeignKeyViolation(_) => ApiError::not_found("User or post not found"),
                other => other.into(),
            })
    }

    pub async fn comments(&self, post_id: Uuid) -> Result<Vec<Comment>, ApiError> {
        self.get(post_id).await?;
        Ok(self.store.list_comments(post_id).await?)
    }
}
