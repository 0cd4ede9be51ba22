#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use social_api::config::AppConfig;
use social_api::database::{MemoryStore, Store};
use social_api::{app, AppState};

/// Router over a fresh in-memory store, driven in-process
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::development();
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        Self {
            router: app(AppState::new(store, &config), &config),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&value)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, Some(body)).await
    }

    /// Register a local account and return its id
    pub async fn register(&self, username: &str, email: &str) -> Result<String> {
        let (status, body) = self
            .post(
                "/api/auth/register",
                json!({ "username": username, "email": email, "password": "secret" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        id_of(&body)
    }

    pub async fn create_post(&self, author_id: &str, post_type: &str, tags: &[&str]) -> Result<String> {
        let (status, body) = self
            .post(
                "/api/post",
                json!({
                    "authorId": author_id,
                    "title": "Hello",
                    "type": post_type,
                    "tags": tags,
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create post failed: {} {}", status, body);
        id_of(&body)
    }

    pub async fn create_group(&self, creator_id: &str, name: &str) -> Result<String> {
        let (status, body) = self
            .post(
                "/api/group/create",
                json!({ "name": name, "bio": "", "creatorId": creator_id, "members": [] }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create group failed: {} {}", status, body);
        id_of(&body)
    }
}

pub fn id_of(body: &Value) -> Result<String> {
    body["id"]
        .as_str()
        .map(str::to_string)
        .with_context(|| format!("no id in {}", body))
}
