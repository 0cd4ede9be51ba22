mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn health_and_root_respond() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Social API");
    Ok(())
}

#[tokio::test]
async fn register_then_login_end_to_end() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/auth/register",
            json!({ "username": "a", "email": "A@x.com", "password": "p" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "a@x.com");
    assert!(body.get("password").is_none());

    let (status, user) = app
        .post("/api/auth/login", json!({ "email": "a@x.com", "password": "p" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], body["id"]);
    assert!(user.get("password").is_none());

    let (status, err) = app
        .post("/api/auth/login", json!({ "email": "a@x.com", "password": "wrong" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Incorrect email or password");
    assert_eq!(err["error"], true);
    Ok(())
}

#[tokio::test]
async fn login_with_unknown_email() -> Result<()> {
    let app = TestApp::new();
    let (status, err) = app
        .post("/api/auth/login", json!({ "email": "ghost@x.com", "password": "p" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "No user found");
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let app = TestApp::new();
    app.register("a", "a@x.com").await?;

    let (status, _) = app
        .post(
            "/api/auth/register",
            json!({ "username": "b", "email": "A@X.com", "password": "q" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post("/api/auth/register/social", json!({ "name": "b", "email": "a@x.com" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn social_registration_has_no_password() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app
        .post("/api/auth/register/social", json!({ "name": "s", "email": "s@x.com" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post("/api/auth/login", json!({ "email": "s@x.com", "password": "" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn user_lookup_embeds_profile() -> Result<()> {
    let app = TestApp::new();
    let id = app.register("a", "a@x.com").await?;

    let (status, body) = app.post("/api/auth/user", json!({ "email": "a@x.com" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["profile"]["onboarded"], false);

    let (status, body) = app.post("/api/auth/user", json!({ "email": "b@x.com" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn invalid_bodies_are_rejected_before_the_service() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/auth/register",
            json!({ "username": "", "email": "not-an-email", "password": "p" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_string());
    assert!(body["field_errors"]["username"].is_string());

    let (status, body) = app.post("/api/auth/login", json!({ "email": "a@x.com" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let limit = social_api::config::AppConfig::development().api.max_request_size_bytes;
    let padding = "x".repeat(limit + 1);

    let (status, _) = app
        .post(
            "/api/auth/register",
            json!({ "username": "a", "email": "a@x.com", "password": padding }),
        )
        .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}
