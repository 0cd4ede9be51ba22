use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{
    Group, GroupChanges, GroupDetail, GroupMember, GroupUser, NewGroup, NewMember,
};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;
use crate::middleware::validate::validate_required;
use crate::middleware::{FieldErrors, Validate};

const MAX_NAME_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    pub image: Option<String>,
    pub banner: Option<String>,
    pub creator_id: Uuid,
    #[serde(default)]
    pub members: Vec<NewMember>,
}

impl Validate for CreateGroupRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.check("name", validate_required(&self.name, "Group name", MAX_NAME_CHARS));
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditGroupRequest {
    pub requester_id: Uuid,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub banner: Option<String>,
}

impl EditGroupRequest {
    fn changes(&self) -> GroupChanges {
        GroupChanges {
            name: self.name.as_ref().map(|n| n.trim().to_string()),
            bio: self.bio.clone(),
            image: self.image.clone(),
            banner: self.banner.clone(),
        }
    }
}

impl Validate for EditGroupRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.changes().is_empty() {
            return Err(ApiError::bad_request("No group fields supplied"));
        }
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.check("name", validate_required(name, "Group name", MAX_NAME_CHARS));
        }
        errors.into_result()
    }
}

/// Creator-gated action on one member
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberActionRequest {
    pub member_id: Uuid,
    pub requester_id: Uuid,
}

impl Validate for MemberActionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub user_id: Uuid,
}

impl Validate for MembershipRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGroupRequest {
    pub requester_id: Uuid,
}

impl Validate for DeleteGroupRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminsQuery {
    #[serde(default = "first_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

impl Validate for AdminsQuery {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        if self.page < 1 {
            errors.add("page", "Page must be 1 or greater");
        }
        errors.into_result()
    }
}

/// Drop repeated member rows and any row naming the creator
fn dedupe_members(creator_id: Uuid, members: Vec<NewMember>) -> Vec<NewMember> {
    let mut unique: Vec<NewMember> = Vec::with_capacity(members.len());
    for member in members {
        if member.user_id != creator_id && !unique.iter().any(|m| m.user_id == member.user_id) {
            unique.push(member);
        }
    }
    unique
}

fn membership_not_found(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::NotFound(_) => ApiError::not_found("Membership not found"),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct GroupService {
    store: Arc<dyn Store>,
    page_size: i64,
}

impl GroupService {
    pub fn new(store: Arc<dyn Store>, page_size: i64) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Group>, ApiError> {
        Ok(self.store.list_groups().await?)
    }

    /// Create the group with its creator as admin plus any supplied members
    pub async fn create(&self, req: CreateGroupRequest) -> Result<GroupDetail, ApiError> {
        let members = dedupe_members(req.creator_id, req.members);
        let detail = self
            .store
            .create_group(NewGroup {
                name: req.name.trim().to_string(),
                bio: req.bio,
                image: req.image,
                banner: req.banner,
                creator_id: req.creator_id,
                members,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => {
                    ApiError::conflict("You already created a group with this name")
                }
                DatabaseError::ForeignKeyViolation(_) => ApiError::not_found("Creator or member not found"),
                other => other.into(),
            })?;
        info!("Created group {} with {} members", detail.group.id, detail.members.len());
        Ok(detail)
    }

    pub async fn get(&self, id: Uuid) -> Result<GroupDetail, ApiError> {
        self.store
            .find_group_detail(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Group not found"))
    }

    /// One page of members, admins first. An empty page is NotFound.
    pub async fn list_admins(&self, id: Uuid, query: AdminsQuery) -> Result<Vec<GroupMember>, ApiError> {
        self.find(id).await?;
        let offset = (query.page - 1).saturating_mul(self.page_size);
        let members = self.store.list_members(id, self.page_size, offset).await?;
        if members.is_empty() {
            return Err(ApiError::not_found(format!("No members on page {}", query.page)));
        }
        Ok(members)
    }

    pub async fn add_admin(&self, id: Uuid, req: MemberActionRequest) -> Result<GroupUser, ApiError> {
        self.authorize_creator(id, req.requester_id, "promote admins").await?;
        self.store
            .set_admin(id, req.member_id, true)
            .await
            .map_err(membership_not_found)
    }

    pub async fn remove_admin(&self, id: Uuid, req: MemberActionRequest) -> Result<GroupUser, ApiError> {
        self.authorize_creator(id, req.requester_id, "demote admins").await?;
        self.store
            .set_admin(id, req.member_id, false)
            .await
            .map_err(membership_not_found)
    }

    pub async fn edit(&self, id: Uuid, req: EditGroupRequest) -> Result<Group, ApiError> {
        self.authorize_creator(id, req.requester_id, "edit the group").await?;
        self.store
            .update_group(id, req.changes())
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => {
                    ApiError::conflict("You already created a group with this name")
                }
                DatabaseError::NotFound(_) => ApiError::not_found("Group not found"),
                other => other.into(),
            })
    }

    pub async fn join(&self, id: Uuid, req: MembershipRequest) -> Result<GroupUser, ApiError> {
        self.store.add_member(id, req.user_id).await.map_err(|e| match e {
            DatabaseError::UniqueViolation(_) => ApiError::conflict("Already a member of this group"),
            DatabaseError::ForeignKeyViolation(_) => ApiError::not_found("User or group not found"),
            other => other.into(),
        })
    }

    pub async fn leave(&self, id: Uuid, req: MembershipRequest) -> Result<(), ApiError> {
        self.store
            .remove_member(id, req.user_id)
            .await
            .map_err(membership_not_found)
    }

    pub async fn remove_member(&self, id: Uuid, req: MemberActionRequest) -> Result<(), ApiError> {
        self.authorize_creator(id, req.requester_id, "remove members").await?;
        self.store
            .remove_member(id, req.member_id)
            .await
            .map_err(membership_not_found)
    }

    pub async fn delete(&self, id: Uuid, req: DeleteGroupRequest) -> Result<(), ApiError> {
        self.authorize_creator(id, req.requester_id, "delete the group").await?;
        self.store.delete_group(id).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => ApiError::not_found("Group not found"),
            other => other.into(),
        })?;
        info!("Deleted group {}", id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Group, ApiError> {
        self.store
            .find_group(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Group not found"))
    }

    /// NotFound when the group is absent, Forbidden unless `requester_id` created it
    async fn authorize_creator(&self, id: Uuid, requester_id: Uuid, action: &str) -> Result<Group, ApiError> {
        let group = self.find(id).await?;
        if group.creator_id != requester_id {
            warn!("User {} may not {} for group {}", requester_id, action, id);
            return Err(ApiError::forbidden(format!("Only the group creator can {}", action)));
        }
        Ok(group)
    }
}
