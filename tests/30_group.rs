mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{id_of, TestApp};

struct World {
    app: TestApp,
    creator: String,
    member: String,
    group: String,
}

async fn world() -> Result<World> {
    let app = TestApp::new();
    let creator = app.register("creator", "creator@x.com").await?;
    let member = app.register("member", "member@x.com").await?;
    let group = app.create_group(&creator, "Rustaceans").await?;
    let (status, _) = app
        .post(&format!("/api/group/{}/join", group), json!({ "userId": member }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(World {
        app,
        creator,
        member,
        group,
    })
}

#[tokio::test]
async fn create_embeds_creator_as_admin() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator", "creator@x.com").await?;
    let other = app.register("other", "other@x.com").await?;

    let (status, group) = app
        .post(
            "/api/group/create",
            json!({
                "name": "Rustaceans",
                "bio": "crabs",
                "creatorId": creator,
                "members": [{ "userId": other }, { "userId": other }, { "userId": creator }],
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(group["creator"]["id"], creator.as_str());
    let members = group["members"].as_array().cloned().unwrap_or_default();
    assert_eq!(members.len(), 2);
    let creator_row = members.iter().find(|m| m["userId"] == creator.as_str());
    assert_eq!(creator_row.map(|m| m["isAdmin"].clone()), Some(json!(true)));

    let (status, _) = app
        .post(
            "/api/group/create",
            json!({ "name": "Rustaceans", "bio": "", "creatorId": creator }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // same name, different creator is fine
    app.create_group(&other, "Rustaceans").await?;

    let (status, groups) = app.get("/api/group").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(groups.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn fetch_group_and_missing_group() -> Result<()> {
    let w = world().await?;
    let (status, group) = w.app.get(&format!("/api/group/{}", w.group)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(group["name"], "Rustaceans");
    assert_eq!(group["members"].as_array().map(Vec::len), Some(2));

    let (status, _) = w.app.get(&format!("/api/group/{}", Uuid::new_v4())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn only_creator_manages_admins() -> Result<()> {
    let w = world().await?;
    let uri = format!("/api/group/{}/add-admin", w.group);

    let (status, _) = w
        .app
        .patch(&uri, json!({ "memberId": w.member, "requesterId": w.member }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, group) = w.app.get(&format!("/api/group/{}", w.group)).await?;
    let row = group["members"]
        .as_array()
        .and_then(|m| m.iter().find(|r| r["userId"] == w.member.as_str()).cloned());
    assert_eq!(row.map(|r| r["isAdmin"].clone()), Some(json!(false)));

    let (status, row) = w
        .app
        .patch(&uri, json!({ "memberId": w.member, "requesterId": w.creator }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["isAdmin"], true);

    let (status, _) = w
        .app
        .patch(
            &format!("/api/group/{}/remove-admin", w.group),
            json!({ "memberId": w.member, "requesterId": w.member }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, group) = w.app.get(&format!("/api/group/{}", w.group)).await?;
    let row = group["members"]
        .as_array()
        .and_then(|m| m.iter().find(|r| r["userId"] == w.member.as_str()).cloned());
    assert_eq!(row.map(|r| r["isAdmin"].clone()), Some(json!(true)));

    let (status, row) = w
        .app
        .patch(
            &format!("/api/group/{}/remove-admin", w.group),
            json!({ "memberId": w.member, "requesterId": w.creator }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["isAdmin"], false);

    let (status, _) = w
        .app
        .patch(&uri, json!({ "memberId": Uuid::new_v4(), "requesterId": w.creator }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admin_listing_pages() -> Result<()> {
    let w = world().await?;

    let (status, page) = w.app.get(&format!("/api/group/{}/admins?page=1", w.group)).await?;
    assert_eq!(status, StatusCode::OK);
    let rows = page.as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["userId"], w.creator.as_str());
    assert!(rows[0]["user"]["profile"].is_object());

    let (status, body) = w.app.get(&format!("/api/group/{}/admins?page=2", w.group)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No members on page 2");

    let (status, _) = w.app.get(&format!("/api/group/{}/admins?page=0", w.group)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = w
        .app
        .get(&format!("/api/group/{}/admins", Uuid::new_v4()))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Group not found");
    Ok(())
}

#[tokio::test]
async fn edit_is_creator_only() -> Result<()> {
    let w = world().await?;
    let uri = format!("/api/group/{}", w.group);

    let (status, _) = w
        .app
        .patch(&uri, json!({ "requesterId": w.member, "name": "Hijacked" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, group) = w
        .app
        .patch(&uri, json!({ "requesterId": w.creator, "bio": "all about crabs" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(group["name"], "Rustaceans");
    assert_eq!(group["bio"], "all about crabs");

    let (status, _) = w.app.patch(&uri, json!({ "requesterId": w.creator })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn join_leave_and_remove() -> Result<()> {
    let w = world().await?;
    let join = format!("/api/group/{}/join", w.group);
    let leave = format!("/api/group/{}/leave", w.group);

    let (status, _) = w.app.post(&join, json!({ "userId": w.member })).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = w.app.delete(&leave, json!({ "userId": w.member })).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = w.app.delete(&leave, json!({ "userId": w.member })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    w.app.post(&join, json!({ "userId": w.member })).await?;
    let remove = format!("/api/group/{}/remove", w.group);
    let (status, _) = w
        .app
        .delete(&remove, json!({ "memberId": w.member, "requesterId": w.member }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = w
        .app
        .delete(&remove, json!({ "memberId": w.member, "requesterId": w.creator }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member removed");

    let (status, _) = w
        .app
        .post(&format!("/api/group/{}/join", Uuid::new_v4()), json!({ "userId": w.member }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_group_cascades_posts() -> Result<()> {
    let w = world().await?;
    let (status, post) = w
        .app
        .post(
            "/api/post",
            json!({
                "authorId": w.member,
                "groupId": w.group,
                "title": "In the group",
                "type": "STANDARD",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = id_of(&post)?;

    let uri = format!("/api/group/{}", w.group);
    let (status, _) = w.app.delete(&uri, json!({ "requesterId": w.member })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = w.app.delete(&uri, json!({ "requesterId": w.creator })).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = w.app.get(&uri).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = w.app.get(&format!("/api/post/{}", post_id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = w.app.delete(&uri, json!({ "requesterId": w.creator })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
