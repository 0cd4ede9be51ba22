use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::{Profile, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub image: Option<String>,
    pub banner: Option<String>,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Membership row, keyed by (user_id, group_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GroupUser {
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub creator: UserSummary,
    pub members: Vec<GroupUser>,
}

/// Membership row with the member's public data embedded, as returned by
/// the paginated admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub is_admin: bool,
    pub user: MemberUser,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUser {
    pub id: Uuid,
    pub image: Option<String>,
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub user_id: Uuid,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub bio: String,
    pub image: Option<String>,
    pub banner: Option<String>,
    pub creator_id: Uuid,
    /// Extra members; never contains the creator
    pub members: Vec<NewMember>,
}

#[derive(Debug, Clone, Default)]
pub struct GroupChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub banner: Option<String>,
}

impl GroupChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.image.is_none() && self.banner.is_none()
    }
}
