use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::auth::{hash_password, verify_password};
use crate::database::models::{NewUser, User, UserWithProfile};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;
use crate::middleware::validate::{validate_email_format, validate_required, validate_username_format};
use crate::middleware::{FieldErrors, Validate};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.check("username", validate_username_format(&self.username));
        errors.check("email", validate_email_format(&self.email));
        errors.check("password", validate_required(&self.password, "Password", 256));
        errors.into_result()
    }
}

/// Registration through an external identity provider; no password
#[derive(Debug, Deserialize)]
pub struct SocialRegisterRequest {
    pub name: String,
    pub email: String,
}

impl Validate for SocialRegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.check("name", validate_username_format(&self.name));
        errors.check("email", validate_email_format(&self.email));
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.check("email", validate_required(&self.email, "Email", 320));
        errors.check("password", validate_required(&self.password, "Password", 256));
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
pub struct UserLookupRequest {
    pub email: String,
}

impl Validate for UserLookupRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.check("email", validate_required(&self.email, "Email", 320));
        errors.into_result()
    }
}

/// Emails are stored trimmed and lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a local account with a hashed password and an empty profile
    pub async fn register(&self, req: RegisterRequest) -> Result<User, ApiError> {
        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| {
                error!("Password hashing task failed: {}", e);
                ApiError::internal_server_error("Failed to register user")
            })?
            .map_err(|e| {
                error!("{}", e);
                ApiError::internal_server_error("Failed to register user")
            })?;

        self.create(NewUser {
            username: req.username.trim().to_string(),
            email: normalize_email(&req.email),
            password_hash: Some(password_hash),
        })
        .await
    }

    pub async fn register_social(&self, req: SocialRegisterRequest) -> Result<User, ApiError> {
        self.create(NewUser {
            username: req.name.trim().to_string(),
            email: normalize_email(&req.email),
            password_hash: None,
        })
        .await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
        match self.store.create_user(new_user).await {
            Ok(user) => {
                info!("Registered user {}", user.id);
                Ok(user)
            }
            Err(DatabaseError::UniqueViolation(_)) => Err(ApiError::conflict("User already exists")),
            Err(other) => Err(other.into()),
        }
    }

    /// Verify credentials and return the stored user record
    pub async fn login(&self, req: LoginRequest) -> Result<User, ApiError> {
        let email = normalize_email(&req.email);
        let Some(user) = self.store.find_user_by_email(&email).await? else {
            debug!("Login for unknown email");
            return Err(ApiError::bad_request("No user found"));
        };

        let password = req.password;
        let stored_hash = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, stored_hash.as_deref()))
            .await
            .map_err(|e| {
                error!("Password verification task failed: {}", e);
                ApiError::internal_server_error("Failed to verify credentials")
            })?;

        if !matches {
            debug!("Login rejected for user {}", user.id);
            return Err(ApiError::bad_request("Incorrect email or password"));
        }
        Ok(user)
    }

    /// User with embedded profile; 404 when absent, 500 on storage failure
    pub async fn get_user_by_email(&self, req: UserLookupRequest) -> Result<UserWithProfile, ApiError> {
        let email = normalize_email(&req.email);
        self.store
            .find_user_with_profile_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }
}
