use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account row. Social-login accounts carry no password hash.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub username: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One-to-one with [`User`], created together with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub journey: Option<String>,
    pub tech: Option<String>,
    pub ambition: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
    pub onboarded: bool,
}

impl Profile {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            bio: None,
            journey: None,
            tech: None,
            ambition: None,
            github: None,
            linkedin: None,
            twitter: None,
            website: None,
            onboarded: false,
        }
    }

    pub fn apply(&mut self, changes: &ProfileChanges) {
        let fields = [
            (&mut self.bio, &changes.bio),
            (&mut self.journey, &changes.journey),
            (&mut self.tech, &changes.tech),
            (&mut self.ambition, &changes.ambition),
            (&mut self.github, &changes.github),
            (&mut self.linkedin, &changes.linkedin),
            (&mut self.twitter, &changes.twitter),
            (&mut self.website, &changes.website),
        ];
        for (current, change) in fields {
            if let Some(value) = change {
                *current = Some(value.clone());
            }
        }
        if let Some(onboarded) = changes.onboarded {
            self.onboarded = onboarded;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<Profile>,
}

/// Public projection used when a user is embedded in another entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub image: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            image: user.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub journey: Option<String>,
    pub tech: Option<String>,
    pub ambition: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
    pub onboarded: Option<bool>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.bio.is_none()
            && self.journey.is_none()
            && self.tech.is_none()
            && self.ambition.is_none()
            && self.github.is_none()
            && self.linkedin.is_none()
            && self.twitter.is_none()
            && self.website.is_none()
            && self.onboarded.is_none()
    }
}
