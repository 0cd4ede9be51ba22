use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Comment, Follow, Group, GroupChanges, GroupDetail, GroupMember, GroupUser, Like, NewComment,
    NewGroup, NewPost, NewUser, Post, PostChanges, PostType, Profile, ProfileChanges, Tag, User,
    UserSummary, UserWithProfile,
};

/// Storage interface shared by the Postgres and in-memory backends.
///
/// Every method reports constraint failures through [`DatabaseError`]:
/// `UniqueViolation` for duplicate keys, `ForeignKeyViolation` when a
/// referenced row is missing, and `NotFound` when an update or delete
/// matched nothing.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Users and profiles

    /// Insert the user and its empty profile atomically
    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_user_with_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithProfile>, DatabaseError>;
    async fn find_user_with_profile(&self, id: Uuid) -> Result<Option<UserWithProfile>, DatabaseError>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Profile, DatabaseError>;
    async fn delete_user(&self, id: Uuid) -> Result<(), DatabaseError>;

    // Follows

    async fn create_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Follow, DatabaseError>;
    async fn delete_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), DatabaseError>;
    async fn list_followers(&self, user_id: Uuid) -> Result<Vec<UserSummary>, DatabaseError>;
    async fn list_following(&self, user_id: Uuid) -> Result<Vec<UserSummary>, DatabaseError>;

    // Posts, tags, likes, comments

    /// Newest first, optionally restricted to one type
    async fn list_posts(&self, post_type: Option<PostType>) -> Result<Vec<Post>, DatabaseError>;
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DatabaseError>;
    /// Resolve-or-create every tag and insert the post in one unit
    async fn create_post(&self, new_post: NewPost) -> Result<Post, DatabaseError>;
    async fn update_post(&self, id: Uuid, changes: PostChanges) -> Result<Post, DatabaseError>;
    async fn delete_post(&self, id: Uuid) -> Result<(), DatabaseError>;
    async fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError>;

    async fn create_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Like, DatabaseError>;
    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(), DatabaseError>;
    async fn list_likes(&self, post_id: Uuid) -> Result<Vec<Like>, DatabaseError>;

    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment, DatabaseError>;
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DatabaseError>;

    // Groups and memberships

    async fn list_groups(&self) -> Result<Vec<Group>, DatabaseError>;
    /// Insert the group, the creator as admin member, and any extra members
    async fn create_group(&self, new_group: NewGroup) -> Result<GroupDetail, DatabaseError>;
    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, DatabaseError>;
    async fn find_group_detail(&self, id: Uuid) -> Result<Option<GroupDetail>, DatabaseError>;
    async fn update_group(&self, id: Uuid, changes: GroupChanges) -> Result<Group, DatabaseError>;
    async fn delete_group(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn list_members(
        &self,
        group_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GroupMember>, DatabaseError>;
    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> Result<GroupUser, DatabaseError>;
    async fn set_admin(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<GroupUser, DatabaseError>;
    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<(), DatabaseError>;
}
