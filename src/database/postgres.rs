use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Comment, Follow, Group, GroupChanges, GroupDetail, GroupMember, GroupUser, Like, MemberUser,
    NewComment, NewGroup, NewPost, NewUser, Post, PostChanges, PostType, Profile, ProfileChanges,
    Tag, User, UserSummary, UserWithProfile,
};
use crate::database::store::Store;

const USER_COLUMNS: &str = "id, email, password, username, image, created_at";
const GROUP_COLUMNS: &str = "id, name, bio, image, banner, creator_id, created_at";

/// Post columns plus the aggregated tag names. Callers append WHERE,
/// GROUP BY and ORDER BY.
const POST_SELECT: &str = r#"
    SELECT p.id, p.author_id, p.group_id, p.post_type, p.title, p.content,
           p.image_url, p.video_url, p.meetup_date, p.meetup_location, p.views, p.created_at,
           COALESCE(array_agg(t.name ORDER BY t.name) FILTER (WHERE t.name IS NOT NULL),
                    ARRAY[]::text[]) AS tags
    FROM posts p
    LEFT JOIN post_tags pt ON pt.post_id = p.id
    LEFT JOIN tags t ON t.id = pt.tag_id
"#;

#[derive(FromRow)]
struct MemberRow {
    user_id: Uuid,
    group_id: Uuid,
    is_admin: bool,
    image: Option<String>,
    profile: Option<Json<Profile>>,
}

impl From<MemberRow> for GroupMember {
    fn from(row: MemberRow) -> Self {
        GroupMember {
            user_id: row.user_id,
            group_id: row.group_id,
            is_admin: row.is_admin,
            user: MemberUser {
                id: row.user_id,
                image: row.image,
                profile: row.profile.map(|json| json.0),
            },
        }
    }
}

/// Postgres-backed [`Store`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_post(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Post, DatabaseError> {
        let sql = format!("{POST_SELECT} WHERE p.id = $1 GROUP BY p.id");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(post)
    }

    async fn fetch_profile(&self, user: User) -> Result<UserWithProfile, DatabaseError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(UserWithProfile { user, profile })
    }

    fn expect_affected(rows: u64, what: &str) -> Result<(), DatabaseError> {
        if rows == 0 {
            return Err(DatabaseError::NotFound(format!("{} not found", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO users (email, password, username) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.username)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_with_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithProfile>, DatabaseError> {
        match self.find_user_by_email(email).await? {
            Some(user) => Ok(Some(self.fetch_profile(user).await?)),
            None => Ok(None),
        }
    }

    async fn find_user_with_profile(&self, id: Uuid) -> Result<Option<UserWithProfile>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match user {
            Some(user) => Ok(Some(self.fetch_profile(user).await?)),
            None => Ok(None),
        }
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Profile, DatabaseError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET
                bio = COALESCE($2, bio),
                journey = COALESCE($3, journey),
                tech = COALESCE($4, tech),
                ambition = COALESCE($5, ambition),
                github = COALESCE($6, github),
                linkedin = COALESCE($7, linkedin),
                twitter = COALESCE($8, twitter),
                website = COALESCE($9, website),
                onboarded = COALESCE($10, onboarded)
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&changes.bio)
        .bind(&changes.journey)
        .bind(&changes.tech)
        .bind(&changes.ambition)
        .bind(&changes.github)
        .bind(&changes.linkedin)
        .bind(&changes.twitter)
        .bind(&changes.website)
        .bind(changes.onboarded)
        .fetch_optional(&self.pool)
        .await?;

        profile.ok_or_else(|| DatabaseError::NotFound("Profile not found".to_string()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Self::expect_affected(result.rows_affected(), "User")
    }

    async fn create_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Follow, DatabaseError> {
        let follow = sqlx::query_as::<_, Follow>(
            "INSERT INTO follows (follower_id, following_id) VALUES ($1, $2)
             RETURNING follower_id, following_id, created_at",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(follow)
    }

    async fn delete_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.pool)
            .await?;
        Self::expect_affected(result.rows_affected(), "Follow")
    }

    async fn list_followers(&self, user_id: Uuid) -> Result<Vec<UserSummary>, DatabaseError> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT u.id, u.username, u.image
             FROM follows f JOIN users u ON u.id = f.follower_id
             WHERE f.following_id = $1
             ORDER BY f.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn list_following(&self, user_id: Uuid) -> Result<Vec<UserSummary>, DatabaseError> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT u.id, u.username, u.image
             FROM follows f JOIN users u ON u.id = f.following_id
             WHERE f.follower_id = $1
             ORDER BY f.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn list_posts(&self, post_type: Option<PostType>) -> Result<Vec<Post>, DatabaseError> {
        let sql = format!(
            "{POST_SELECT} WHERE ($1::post_type IS NULL OR p.post_type = $1)
             GROUP BY p.id ORDER BY p.created_at DESC"
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(post_type)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DatabaseError> {
        let sql = format!("{POST_SELECT} WHERE p.id = $1 GROUP BY p.id");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn create_post(&self, new_post: NewPost) -> Result<Post, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Tag rows are always locked in name order
        let mut names = new_post.tags.clone();
        names.sort();
        names.dedup();

        let mut tag_ids = Vec::with_capacity(names.len());
        for name in &names {
            let (tag_id,): (Uuid,) = sqlx::query_as(
                "INSERT INTO tags (name) VALUES ($1)
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                 RETURNING id",
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;
            tag_ids.push(tag_id);
        }

        let (post_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO posts (author_id, group_id, post_type, title, content,
                               image_url, video_url, meetup_date, meetup_location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(new_post.author_id)
        .bind(new_post.group_id)
        .bind(new_post.post_type)
        .bind(&new_post.title)
        .bind(&new_post.content)
        .bind(&new_post.image_url)
        .bind(&new_post.video_url)
        .bind(new_post.meetup_date)
        .bind(&new_post.meetup_location)
        .fetch_one(&mut *tx)
        .await?;

        if !tag_ids.is_empty() {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) SELECT $1, UNNEST($2::uuid[])")
                .bind(post_id)
                .bind(&tag_ids)
                .execute(&mut *tx)
                .await?;
        }

        let post = Self::fetch_post(&mut tx, post_id).await?;
        tx.commit().await?;
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, changes: PostChanges) -> Result<Post, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE posts SET title = COALESCE($2, title), content = COALESCE($3, content)
             WHERE id = $1",
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .execute(&mut *tx)
        .await?;
        Self::expect_affected(updated.rows_affected(), "Post")?;

        let post = Self::fetch_post(&mut tx, id).await?;
        tx.commit().await?;
        Ok(post)
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Self::expect_affected(result.rows_affected(), "Post")
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn create_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Like, DatabaseError> {
        let like = sqlx::query_as::<_, Like>(
            "INSERT INTO likes (user_id, post_id) VALUES ($1, $2)
             RETURNING user_id, post_id, created_at",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(like)
    }

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Self::expect_affected(result.rows_affected(), "Like")
    }

    async fn list_likes(&self, post_id: Uuid) -> Result<Vec<Like>, DatabaseError> {
        let likes = sqlx::query_as::<_, Like>(
            "SELECT user_id, post_id, created_at FROM likes WHERE post_id = $1 ORDER BY created_at",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }

    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment, DatabaseError> {
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (author_id, post_id, content) VALUES ($1, $2, $3)
             RETURNING id, author_id, post_id, content, created_at",
        )
        .bind(new_comment.author_id)
        .bind(new_comment.post_id)
        .bind(&new_comment.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DatabaseError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, author_id, post_id, content, created_at
             FROM comments WHERE post_id = $1 ORDER BY created_at",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DatabaseError> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM groups ORDER BY created_at DESC");
        let groups = sqlx::query_as::<_, Group>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    async fn create_group(&self, new_group: NewGroup) -> Result<GroupDetail, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO groups (name, bio, image, banner, creator_id)
             VALUES ($1, $2, $3, $4, $5) RETURNING {GROUP_COLUMNS}"
        );
        let group = sqlx::query_as::<_, Group>(&sql)
            .bind(&new_group.name)
            .bind(&new_group.bio)
            .bind(&new_group.image)
            .bind(&new_group.banner)
            .bind(new_group.creator_id)
            .fetch_one(&mut *tx)
            .await?;

        let mut members = Vec::with_capacity(new_group.members.len() + 1);
        let creator_row = std::iter::once((new_group.creator_id, true));
        let extra_rows = new_group.members.iter().map(|m| (m.user_id, m.is_admin));
        for (user_id, is_admin) in creator_row.chain(extra_rows) {
            let member = sqlx::query_as::<_, GroupUser>(
                "INSERT INTO group_users (user_id, group_id, is_admin) VALUES ($1, $2, $3)
                 RETURNING user_id, group_id, is_admin, joined_at",
            )
            .bind(user_id)
            .bind(group.id)
            .bind(is_admin)
            .fetch_one(&mut *tx)
            .await?;
            members.push(member);
        }

        let creator = sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, image FROM users WHERE id = $1",
        )
        .bind(group.creator_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(GroupDetail { group, creator, members })
    }

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, DatabaseError> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1");
        let group = sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    async fn find_group_detail(&self, id: Uuid) -> Result<Option<GroupDetail>, DatabaseError> {
        let Some(group) = self.find_group(id).await? else {
            return Ok(None);
        };

        let creator = sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, image FROM users WHERE id = $1",
        )
        .bind(group.creator_id)
        .fetch_one(&self.pool)
        .await?;

        let members = sqlx::query_as::<_, GroupUser>(
            "SELECT user_id, group_id, is_admin, joined_at
             FROM group_users WHERE group_id = $1 ORDER BY joined_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(GroupDetail { group, creator, members }))
    }

    async fn update_group(&self, id: Uuid, changes: GroupChanges) -> Result<Group, DatabaseError> {
        let sql = format!(
            "UPDATE groups SET
                name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                image = COALESCE($4, image),
                banner = COALESCE($5, banner)
             WHERE id = $1
             RETURNING {GROUP_COLUMNS}"
        );
        let group = sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.bio)
            .bind(&changes.image)
            .bind(&changes.banner)
            .fetch_optional(&self.pool)
            .await?;
        group.ok_or_else(|| DatabaseError::NotFound("Group not found".to_string()))
    }

    async fn delete_group(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Self::expect_affected(result.rows_affected(), "Group")
    }

    async fn list_members(
        &self,
        group_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GroupMember>, DatabaseError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT gu.user_id, gu.group_id, gu.is_admin, u.image,
                   CASE WHEN pr.user_id IS NULL THEN NULL ELSE json_build_object(
                       'userId', pr.user_id,
                       'bio', pr.bio,
                       'journey', pr.journey,
                       'tech', pr.tech,
                       'ambition', pr.ambition,
                       'github', pr.github,
                       'linkedin', pr.linkedin,
                       'twitter', pr.twitter,
                       'website', pr.website,
                       'onboarded', pr.onboarded
                   ) END AS profile
            FROM group_users gu
            JOIN users u ON u.id = gu.user_id
            LEFT JOIN profiles pr ON pr.user_id = gu.user_id
            WHERE gu.group_id = $1
            ORDER BY gu.is_admin DESC, gu.joined_at, gu.user_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(group_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GroupMember::from).collect())
    }

    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> Result<GroupUser, DatabaseError> {
        let member = sqlx::query_as::<_, GroupUser>(
            "INSERT INTO group_users (user_id, group_id) VALUES ($1, $2)
             RETURNING user_id, group_id, is_admin, joined_at",
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(member)
    }

    async fn set_admin(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<GroupUser, DatabaseError> {
        let member = sqlx::query_as::<_, GroupUser>(
            "UPDATE group_users SET is_admin = $3 WHERE user_id = $1 AND group_id = $2
             RETURNING user_id, group_id, is_admin, joined_at",
        )
        .bind(user_id)
        .bind(group_id)
        .bind(is_admin)
        .fetch_optional(&self.pool)
        .await?;
        member.ok_or_else(|| DatabaseError::NotFound("Membership not found".to_string()))
    }

    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM group_users WHERE user_id = $1 AND group_id = $2")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Self::expect_affected(result.rows_affected(), "Membership")
    }
}
