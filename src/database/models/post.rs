use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "post_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    Meetup,
    Podcast,
    Standard,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Meetup => "MEETUP",
            PostType::Podcast => "PODCAST",
            PostType::Standard => "STANDARD",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MEETUP" => Ok(PostType::Meetup),
            "PODCAST" => Ok(PostType::Podcast),
            "STANDARD" => Ok(PostType::Standard),
            other => Err(format!(
                "Unknown post type '{}', expected one of MEETUP, PODCAST, STANDARD",
                other
            )),
        }
    }
}

// Request bodies accept the same spellings as the `/type/:type` path.
impl<'de> Deserialize<'de> for PostType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Post row with its tag names already resolved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub meetup_date: Option<DateTime<Utc>>,
    pub meetup_location: Option<String>,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub meetup_date: Option<DateTime<Utc>>,
    pub meetup_location: Option<String>,
    /// Distinct, trimmed tag names
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_type_parses_case_insensitively() {
        assert_eq!("meetup".parse::<PostType>().unwrap(), PostType::Meetup);
        assert_eq!("Podcast".parse::<PostType>().unwrap(), PostType::Podcast);
        assert_eq!("STANDARD".parse::<PostType>().unwrap(), PostType::Standard);
        assert!("video".parse::<PostType>().is_err());
    }

    #[test]
    fn post_type_serializes_as_upper_case() {
        assert_eq!(serde_json::to_value(PostType::Meetup).unwrap(), "MEETUP");
        let parsed: PostType = serde_json::from_value(serde_json::json!("PODCAST")).unwrap();
        assert_eq!(parsed, PostType::Podcast);
        let parsed: PostType = serde_json::from_value(serde_json::json!("meetup")).unwrap();
        assert_eq!(parsed, PostType::Meetup);
        assert!(serde_json::from_value::<PostType>(serde_json::json!("video")).is_err());
    }
}
