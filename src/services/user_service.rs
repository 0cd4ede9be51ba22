use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{Follow, Profile, ProfileChanges, UserSummary, UserWithProfile};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;
use crate::middleware::{FieldErrors, Validate};

impl Validate for ProfileChanges {
    fn validate(&self) -> Result<(), ApiError> {
        if self.is_empty() {
            return Err(ApiError::bad_request("No profile fields supplied"));
        }
        let mut errors = FieldErrors::new();
        let links = [
            ("github", &self.github),
            ("linkedin", &self.linkedin),
            ("twitter", &self.twitter),
            ("website", &self.website),
        ];
        for (field, value) in links {
            if value.as_deref().is_some_and(|v| v.chars().count() > 255) {
                errors.add(field, format!("{} must be at most 255 characters", field));
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub follower_id: Uuid,
}

impl Validate for FollowRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    pub requester_id: Uuid,
}

impl Validate for DeleteUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserWithProfile, ApiError> {
        self.store
            .find_user_with_profile(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Profile, ApiError> {
        self.store.update_profile(id, changes).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => ApiError::not_found("User not found"),
            other => other.into(),
        })
    }

    /// Only the account itself may delete it
    pub async fn delete_user(&self, id: Uuid, req: DeleteUserRequest) -> Result<(), ApiError> {
        if req.requester_id != id {
            warn!("User {} attempted to delete user {}", req.requester_id, id);
            return Err(ApiError::forbidden("Only the account owner can delete this user"));
        }
        self.store.delete_user(id).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => ApiError::not_found("User not found"),
            other => other.into(),
        })?;
        info!("Deleted user {}", id);
        Ok(())
    }

    pub async fn follow(&self, following_id: Uuid, req: FollowRequest) -> Result<Follow, ApiError> {
        if req.follower_id == following_id {
            return Err(ApiError::bad_request("Users cannot follow themselves"));
        }
        self.store
            .create_follow(req.follower_id, following_id)
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => ApiError::conflict("Already following this user"),
                DatabaseError::ForeignKeyViolation(_) => ApiError::not_found("User not found"),
                DatabaseError::CheckViolation(_) => ApiError::bad_request("Users cannot follow themselves"),
                other => other.into(),
            })
    }

    pub async fn unfollow(&self, following_id: Uuid, req: FollowRequest) -> Result<(), ApiError> {
        self.store
            .delete_follow(req.follower_id, following_id)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => ApiError::not_found("Not following this user"),
                other => other.into(),
            })
    }

    pub async fn followers(&self, id: Uuid) -> Result<Vec<UserSummary>, ApiError> {
        self.ensure_exists(id).await?;
        Ok(self.store.list_followers(id).await?)
    }

    pub async fn following(&self, id: Uuid) -> Result<Vec<UserSummary>, ApiError> {
        self.ensure_exists(id).await?;
        Ok(self.store.list_following(id).await?)
    }

    async fn ensure_exists(&self, id: Uuid) -> Result<(), ApiError> {
        match self.store.find_user_with_profile(id).await? {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found("User not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::database::MemoryStore;
    use axum::http::StatusCode;

    async fn setup() -> (UserService, Arc<dyn Store>, Uuid, Uuid) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for email in ["a@x.com", "b@x.com"] {
            let user = store
                .create_user(NewUser {
                    username: email.split('@').next().unwrap_or_default().to_string(),
                    email: email.to_string(),
                    password_hash: None,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        (UserService::new(store.clone()), store, ids[0], ids[1])
    }

    #[tokio::test]
    async fn follow_rules() {
        let (users, _, a, b) = setup().await;

        users.follow(b, FollowRequest { follower_id: a }).await.unwrap();
        let err = users.follow(b, FollowRequest { follower_id: a }).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = users.follow(a, FollowRequest { follower_id: a }).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = users
            .follow(Uuid::new_v4(), FollowRequest { follower_id: a })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        assert_eq!(users.followers(b).await.unwrap()[0].id, a);
        assert_eq!(users.following(a).await.unwrap()[0].id, b);

        users.unfollow(b, FollowRequest { follower_id: a }).await.unwrap();
        let err = users.unfollow(b, FollowRequest { follower_id: a }).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn only_owner_can_delete_account() {
        let (users, store, a, b) = setup().await;

        let err = users
            .delete_user(a, DeleteUserRequest { requester_id: b })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(store.find_user_with_profile(a).await.unwrap().is_some());

        users.delete_user(a, DeleteUserRequest { requester_id: a }).await.unwrap();
        assert!(store.find_user_with_profile(a).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_update_for_unknown_user_is_404() {
        let (users, _, a, _) = setup().await;
        let changes = ProfileChanges {
            onboarded: Some(true),
            ..Default::default()
        };
        assert!(users.update_profile(a, changes.clone()).await.unwrap().onboarded);

        let err = users.update_profile(Uuid::new_v4(), changes).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn empty_profile_patch_is_rejected() {
        assert!(ProfileChanges::default().validate().is_err());
    }
}
