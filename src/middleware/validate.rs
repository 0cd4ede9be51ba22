use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;

/// Schema check run on every request body or query before a handler sees it
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Accumulates per-field problems so a client sees all of them at once
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Record the error from a field rule, if any
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid request", Some(self.errors)))
        }
    }
}

/// JSON body extractor that deserializes and then validates
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large(rejection.body_text()),
                _ => ApiError::invalid_json(rejection.body_text()),
            })?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// Query-string extractor that deserializes and then validates
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidQuery(value))
    }
}

/// Single `:id` path segment parsed as a UUID
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Uuid::parse_str(&raw)
            .map(PathId)
            .map_err(|_| ApiError::bad_request(format!("Invalid id '{}'", raw)))
    }
}

pub fn validate_username_format(username: &str) -> Result<(), String> {
    let username = username.trim();
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.chars().count() > 50 {
        return Err("Username must be at most 50 characters".to_string());
    }
    Ok(())
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("Invalid email format".to_string());
    };
    if local.is_empty() || email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

pub fn validate_required(value: &str, label: &str, max_chars: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", label));
    }
    if value.chars().count() > max_chars {
        return Err(format!("{} must be at most {} characters", label, max_chars));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(validate_username_format("a").is_ok());
        assert!(validate_username_format("  ").is_err());
        assert!(validate_username_format(&"x".repeat(51)).is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email_format("A@x.com").is_ok());
        assert!(validate_email_format("first.last@sub.example.org").is_ok());
        assert!(validate_email_format("no-at-sign.com").is_err());
        assert!(validate_email_format("two@@x.com").is_err());
        assert!(validate_email_format("@x.com").is_err());
        assert!(validate_email_format("a@localhost").is_err());
        assert!(validate_email_format("a b@x.com").is_err());
    }

    #[test]
    fn field_errors_keep_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("title", "Title cannot be empty");
        errors.add("title", "something else");
        match errors.into_result() {
            Err(ApiError::ValidationError { field_errors: Some(fields), .. }) => {
                assert_eq!(fields["title"], "Title cannot be empty");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
