//! Runs against a live Postgres; `DATABASE_URL=... cargo test -- --ignored`

use anyhow::{Context, Result};
use uuid::Uuid;

use social_api::config::AppConfig;
use social_api::database::models::{NewGroup, NewMember, NewPost, NewUser, PostType, ProfileChanges};
use social_api::database::{DatabaseError, DatabaseManager, PgStore, Store};

async fn store() -> Result<PgStore> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();
    anyhow::ensure!(config.database.url.is_some(), "DATABASE_URL is not set");
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("connect")?;
    DatabaseManager::migrate(&pool).await.context("migrate")?;
    Ok(PgStore::new(pool))
}

fn unique_email() -> String {
    format!("{}@test.example.com", Uuid::new_v4().simple())
}

async fn new_user(store: &PgStore) -> Result<Uuid> {
    let user = store
        .create_user(NewUser {
            username: "pg".into(),
            email: unique_email(),
            password_hash: None,
        })
        .await?;
    Ok(user.id)
}

fn new_post(author_id: Uuid, tags: &[&str]) -> NewPost {
    NewPost {
        author_id,
        group_id: None,
        post_type: PostType::Standard,
        title: "pg post".into(),
        content: String::new(),
        image_url: None,
        video_url: None,
        meetup_date: None,
        meetup_location: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[tokio::test]
#[ignore]
async fn user_and_profile_are_created_together() -> Result<()> {
    let store = store().await?;
    let email = unique_email();
    store
        .create_user(NewUser {
            username: "pg".into(),
            email: email.clone(),
            password_hash: Some("$argon2id$fake".into()),
        })
        .await?;

    let found = store
        .find_user_with_profile_by_email(&email)
        .await?
        .context("user missing")?;
    assert!(found.profile.is_some_and(|p| !p.onboarded));

    let err = store
        .create_user(NewUser {
            username: "dup".into(),
            email,
            password_hash: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(_)), "{:?}", err);

    let profile = store
        .update_profile(
            found.user.id,
            ProfileChanges {
                tech: Some("rust".into()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(profile.tech.as_deref(), Some("rust"));
    store.delete_user(found.user.id).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn constraint_violations_are_classified() -> Result<()> {
    let store = store().await?;
    let user = new_user(&store).await?;
    let tag = format!("pg-{}", Uuid::new_v4().simple());
    let post = store.create_post(new_post(user, &[tag.as_str()])).await?;
    assert_eq!(post.tags, vec![tag.clone()]);

    store.create_like(post.id, user).await?;
    let err = store.create_like(post.id, user).await.unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(_)), "{:?}", err);

    let err = store.create_like(Uuid::new_v4(), user).await.unwrap_err();
    assert!(matches!(err, DatabaseError::ForeignKeyViolation(_)), "{:?}", err);

    let err = store.delete_like(Uuid::new_v4(), user).await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)), "{:?}", err);

    let err = store.create_follow(user, user).await.unwrap_err();
    assert!(matches!(err, DatabaseError::CheckViolation(_)), "{:?}", err);

    // second post reuses the tag row
    store.create_post(new_post(user, &[tag.as_str(), tag.as_str()])).await?;
    let tags = store.list_tags().await?;
    assert_eq!(tags.iter().filter(|t| t.name == tag).count(), 1);

    store.delete_user(user).await?;
    assert!(store.find_post(post.id).await?.is_none());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn concurrent_posts_share_one_new_tag_row() -> Result<()> {
    let store = store().await?;
    let user = new_user(&store).await?;
    let tag = format!("race-{}", Uuid::new_v4().simple());

    let (first, second) = tokio::join!(
        store.create_post(new_post(user, &[tag.as_str()])),
        store.create_post(new_post(user, &[tag.as_str(), "shared"])),
    );
    assert_eq!(first?.tags, vec![tag.clone()]);
    assert!(second?.tags.contains(&tag));

    let tags = store.list_tags().await?;
    assert_eq!(tags.iter().filter(|t| t.name == tag).count(), 1);

    store.delete_user(user).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn group_creation_and_creator_cascade() -> Result<()> {
    let store = store().await?;
    let creator = new_user(&store).await?;
    let member = new_user(&store).await?;

    let detail = store
        .create_group(NewGroup {
            name: "pg group".into(),
            bio: String::new(),
            image: None,
            banner: None,
            creator_id: creator,
            members: vec![NewMember {
                user_id: member,
                is_admin: false,
            }],
        })
        .await?;
    assert_eq!(detail.members.len(), 2);

    let page = store.list_members(detail.group.id, 10, 0).await?;
    assert_eq!(page[0].user_id, creator);
    assert!(page[0].is_admin);
    assert!(page[0].user.profile.is_some());

    let err = store.add_member(detail.group.id, member).await.unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(_)), "{:?}", err);

    store.delete_user(creator).await?;
    assert!(store.find_group(detail.group.id).await?.is_none());
    store.delete_user(member).await?;
    Ok(())
}
