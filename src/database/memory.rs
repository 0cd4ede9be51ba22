use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Comment, Follow, Group, GroupChanges, GroupDetail, GroupMember, GroupUser, Like, MemberUser,
    NewComment, NewGroup, NewPost, NewUser, Post, PostChanges, PostType, Profile, ProfileChanges,
    Tag, User, UserSummary, UserWithProfile,
};
use crate::database::store::Store;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<Profile>,
    follows: Vec<Follow>,
    posts: Vec<Post>,
    tags: Vec<Tag>,
    likes: Vec<Like>,
    comments: Vec<Comment>,
    groups: Vec<Group>,
    group_users: Vec<GroupUser>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn has_user(&self, id: Uuid) -> bool {
        self.user(id).is_some()
    }

    fn has_post(&self, id: Uuid) -> bool {
        self.posts.iter().any(|p| p.id == id)
    }

    fn has_group(&self, id: Uuid) -> bool {
        self.groups.iter().any(|g| g.id == id)
    }

    fn with_profile(&self, user: &User) -> UserWithProfile {
        UserWithProfile {
            user: user.clone(),
            profile: self.profiles.iter().find(|p| p.user_id == user.id).cloned(),
        }
    }

    fn group_detail(&self, group: &Group) -> Option<GroupDetail> {
        let creator = self.user(group.creator_id).map(UserSummary::from)?;
        let members = self
            .group_users
            .iter()
            .filter(|m| m.group_id == group.id)
            .cloned()
            .collect();
        Some(GroupDetail {
            group: group.clone(),
            creator,
            members,
        })
    }

    fn resolve_tag(&mut self, name: &str) -> String {
        if let Some(tag) = self.tags.iter().find(|t| t.name == name) {
            return tag.name.clone();
        }
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.tags.push(tag.clone());
        tag.name
    }

    /// Delete posts and everything hanging off them
    fn remove_posts_where(&mut self, pred: impl Fn(&Post) -> bool) -> usize {
        let doomed: Vec<Uuid> = self.posts.iter().filter(|&p| pred(p)).map(|p| p.id).collect();
        self.posts.retain(|p| !doomed.contains(&p.id));
        self.likes.retain(|l| !doomed.contains(&l.post_id));
        self.comments.retain(|c| !doomed.contains(&c.post_id));
        doomed.len()
    }

    fn remove_groups_where(&mut self, pred: impl Fn(&Group) -> bool) -> usize {
        let doomed: Vec<Uuid> = self.groups.iter().filter(|&g| pred(g)).map(|g| g.id).collect();
        self.groups.retain(|g| !doomed.contains(&g.id));
        self.group_users.retain(|m| !doomed.contains(&m.group_id));
        self.remove_posts_where(|p| p.group_id.is_some_and(|gid| doomed.contains(&gid)));
        doomed.len()
    }
}

/// In-process [`Store`] that enforces the same keys, references and
/// cascades as the Postgres schema. Nothing is persisted.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(what: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found", what))
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password: new_user.password_hash,
            username: new_user.username,
            image: None,
            created_at: Utc::now(),
        };
        tables.profiles.push(Profile::empty(user.id));
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_with_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithProfile>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| tables.with_profile(u)))
    }

    async fn find_user_with_profile(&self, id: Uuid) -> Result<Option<UserWithProfile>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.user(id).map(|u| tables.with_profile(u)))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Profile, DatabaseError> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| not_found("Profile"))?;
        profile.apply(&changes);
        Ok(profile.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(id) {
            return Err(not_found("User"));
        }

        tables.remove_groups_where(|g| g.creator_id == id);
        tables.remove_posts_where(|p| p.author_id == id);
        tables.likes.retain(|l| l.user_id != id);
        tables.comments.retain(|c| c.author_id != id);
        tables.group_users.retain(|m| m.user_id != id);
        tables.follows.retain(|f| f.follower_id != id && f.following_id != id);
        tables.profiles.retain(|p| p.user_id != id);
        tables.users.retain(|u| u.id != id);
        Ok(())
    }

    async fn create_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Follow, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(follower_id) || !tables.has_user(following_id) {
            return Err(DatabaseError::ForeignKeyViolation("follows_user_fkey".to_string()));
        }
        if follower_id == following_id {
            return Err(DatabaseError::CheckViolation("follows_check".to_string()));
        }
        if tables
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.following_id == following_id)
        {
            return Err(DatabaseError::UniqueViolation("follows_pkey".to_string()));
        }

        let follow = Follow {
            follower_id,
            following_id,
            created_at: Utc::now(),
        };
        tables.follows.push(follow.clone());
        Ok(follow)
    }

    async fn delete_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.following_id == following_id));
        if tables.follows.len() == before {
            return Err(not_found("Follow"));
        }
        Ok(())
    }

    async fn list_followers(&self, user_id: Uuid) -> Result<Vec<UserSummary>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .rev()
            .filter(|f| f.following_id == user_id)
            .filter_map(|f| tables.user(f.follower_id).map(UserSummary::from))
            .collect())
    }

    async fn list_following(&self, user_id: Uuid) -> Result<Vec<UserSummary>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .rev()
            .filter(|f| f.follower_id == user_id)
            .filter_map(|f| tables.user(f.following_id).map(UserSummary::from))
            .collect())
    }

    async fn list_posts(&self, post_type: Option<PostType>) -> Result<Vec<Post>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .rev()
            .filter(|p| post_type.map_or(true, |t| p.post_type == t))
            .cloned()
            .collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create_post(&self, new_post: NewPost) -> Result<Post, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(new_post.author_id) {
            return Err(DatabaseError::ForeignKeyViolation("posts_author_id_fkey".to_string()));
        }
        if let Some(group_id) = new_post.group_id {
            if !tables.has_group(group_id) {
                return Err(DatabaseError::ForeignKeyViolation("posts_group_id_fkey".to_string()));
            }
        }

        let mut tags: Vec<String> = new_post
            .tags
            .iter()
            .map(|name| tables.resolve_tag(name))
            .collect();
        tags.sort();
        tags.dedup();

        let post = Post {
            id: Uuid::new_v4(),
            author_id: new_post.author_id,
            group_id: new_post.group_id,
            post_type: new_post.post_type,
            title: new_post.title,
            content: new_post.content,
            image_url: new_post.image_url,
            video_url: new_post.video_url,
            meetup_date: new_post.meetup_date,
            meetup_location: new_post.meetup_location,
            views: 0,
            created_at: Utc::now(),
            tags,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, changes: PostChanges) -> Result<Post, DatabaseError> {
        let mut tables = self.tables.write().await;
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("Post"))?;
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.remove_posts_where(|p| p.id == id) {
            0 => Err(not_found("Post")),
            _ => Ok(()),
        }
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut tags = tables.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn create_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Like, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(user_id) || !tables.has_post(post_id) {
            return Err(DatabaseError::ForeignKeyViolation("likes_fkey".to_string()));
        }
        if tables
            .likes
            .iter()
            .any(|l| l.user_id == user_id && l.post_id == post_id)
        {
            return Err(DatabaseError::UniqueViolation("likes_pkey".to_string()));
        }

        let like = Like {
            user_id,
            post_id,
            created_at: Utc::now(),
        };
        tables.likes.push(like.clone());
        Ok(like)
    }

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| !(l.user_id == user_id && l.post_id == post_id));
        if tables.likes.len() == before {
            return Err(not_found("Like"));
        }
        Ok(())
    }

    async fn list_likes(&self, post_id: Uuid) -> Result<Vec<Like>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(new_comment.author_id) || !tables.has_post(new_comment.post_id) {
            return Err(DatabaseError::ForeignKeyViolation("comments_fkey".to_string()));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            author_id: new_comment.author_id,
            post_id: new_comment.post_id,
            content: new_comment.content,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().rev().cloned().collect())
    }

    async fn create_group(&self, new_group: NewGroup) -> Result<GroupDetail, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(new_group.creator_id) {
            return Err(DatabaseError::ForeignKeyViolation("groups_creator_id_fkey".to_string()));
        }
        if tables
            .groups
            .iter()
            .any(|g| g.name == new_group.name && g.creator_id == new_group.creator_id)
        {
            return Err(DatabaseError::UniqueViolation("groups_name_creator_id_key".to_string()));
        }

        let rows: Vec<(Uuid, bool)> = std::iter::once((new_group.creator_id, true))
            .chain(new_group.members.iter().map(|m| (m.user_id, m.is_admin)))
            .collect();
        for (i, (user_id, _)) in rows.iter().enumerate() {
            if !tables.has_user(*user_id) {
                return Err(DatabaseError::ForeignKeyViolation("group_users_user_id_fkey".to_string()));
            }
            if rows[..i].iter().any(|(earlier, _)| earlier == user_id) {
                return Err(DatabaseError::UniqueViolation("group_users_pkey".to_string()));
            }
        }

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name: new_group.name,
            bio: new_group.bio,
            image: new_group.image,
            banner: new_group.banner,
            creator_id: new_group.creator_id,
            created_at: now,
        };
        tables.groups.push(group.clone());
        for (user_id, is_admin) in rows {
            tables.group_users.push(GroupUser {
                user_id,
                group_id: group.id,
                is_admin,
                joined_at: now,
            });
        }

        tables
            .group_detail(&group)
            .ok_or_else(|| not_found("Creator"))
    }

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn find_group_detail(&self, id: Uuid) -> Result<Option<GroupDetail>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .iter()
            .find(|g| g.id == id)
            .and_then(|g| tables.group_detail(g)))
    }

    async fn update_group(&self, id: Uuid, changes: GroupChanges) -> Result<Group, DatabaseError> {
        let mut tables = self.tables.write().await;
        let current = tables
            .groups
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| not_found("Group"))?;

        if let Some(name) = &changes.name {
            let clash = tables
                .groups
                .iter()
                .any(|g| g.id != id && g.creator_id == current.creator_id && &g.name == name);
            if clash {
                return Err(DatabaseError::UniqueViolation("groups_name_creator_id_key".to_string()));
            }
        }

        let group = tables
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found("Group"))?;
        if let Some(name) = changes.name {
            group.name = name;
        }
        if let Some(bio) = changes.bio {
            group.bio = bio;
        }
        if let Some(image) = changes.image {
            group.image = Some(image);
        }
        if let Some(banner) = changes.banner {
            group.banner = Some(banner);
        }
        Ok(group.clone())
    }

    async fn delete_group(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.remove_groups_where(|g| g.id == id) {
            0 => Err(not_found("Group")),
            _ => Ok(()),
        }
    }

    async fn list_members(
        &self,
        group_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GroupMember>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&GroupUser> = tables
            .group_users
            .iter()
            .filter(|m| m.group_id == group_id)
            .collect();
        rows.sort_by(|a, b| {
            b.is_admin
                .cmp(&a.is_admin)
                .then(a.joined_at.cmp(&b.joined_at))
                .then(a.user_id.cmp(&b.user_id))
        });

        let members = rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .filter_map(|m| {
                let user = tables.user(m.user_id)?;
                Some(GroupMember {
                    user_id: m.user_id,
                    group_id: m.group_id,
                    is_admin: m.is_admin,
                    user: MemberUser {
                        id: user.id,
                        image: user.image.clone(),
                        profile: tables.with_profile(user).profile,
                    },
                })
            })
            .collect();
        Ok(members)
    }

    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> Result<GroupUser, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(user_id) || !tables.has_group(group_id) {
            return Err(DatabaseError::ForeignKeyViolation("group_users_fkey".to_string()));
        }
        if tables
            .group_users
            .iter()
            .any(|m| m.user_id == user_id && m.group_id == group_id)
        {
            return Err(DatabaseError::UniqueViolation("group_users_pkey".to_string()));
        }

        let member = GroupUser {
            user_id,
            group_id,
            is_admin: false,
            joined_at: Utc::now(),
        };
        tables.group_users.push(member.clone());
        Ok(member)
    }

    async fn set_admin(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<GroupUser, DatabaseError> {
        let mut tables = self.tables.write().await;
        let member = tables
            .group_users
            .iter_mut()
            .find(|m| m.user_id == user_id && m.group_id == group_id)
            .ok_or_else(|| not_found("Membership"))?;
        member.is_admin = is_admin;
        Ok(member.clone())
    }

    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.group_users.len();
        tables
            .group_users
            .retain(|m| !(m.user_id == user_id && m.group_id == group_id));
        if tables.group_users.len() == before {
            return Err(not_found("Membership"));
        }
        Ok(())
    }
}
