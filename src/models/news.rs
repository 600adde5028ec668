//! News story models and feed bucketing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::upload::{FilePart, THUMBNAIL_TYPES};
use crate::api::ApiError;
use crate::models::{resolve_upload_url, UserId};

/// Who authored a story, as tagged by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsStatus {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsStory {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub status: NewsStatus,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewsStory {
    /// Full URL for the story thumbnail, if one is attached.
    /// Relative values resolve against the backend's uploads directory.
    pub fn thumbnail_url(&self, base_url: &str) -> Option<String> {
        self.thumbnail
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| resolve_upload_url(base_url, t))
    }

    pub fn is_mine(&self, current_user: UserId) -> bool {
        self.user_id == Some(current_user)
    }
}

/// The three sections of the news feed.
#[derive(Debug, Clone, Default)]
pub struct NewsBuckets {
    pub admin: Vec<NewsStory>,
    pub mine: Vec<NewsStory>,
    pub others: Vec<NewsStory>,
}

/// Split the full feed the way the news screen presents it:
/// admin stories first, then the current user's own stories, then
/// stories from everyone else. Ownership is decided on the normalized
/// numeric id, never on raw strings.
pub fn bucket_stories(stories: Vec<NewsStory>, current_user: Option<UserId>) -> NewsBuckets {
    let mut buckets = NewsBuckets::default();
    for story in stories {
        match story.status {
            NewsStatus::Admin => buckets.admin.push(story),
            NewsStatus::User => {
                if current_user.is_some() && story.user_id == current_user {
                    buckets.mine.push(story);
                } else {
                    buckets.others.push(story);
                }
            }
        }
    }
    buckets
}

/// A story being created or edited, before it is sent to the backend.
#[derive(Debug, Clone)]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    pub thumbnail: Option<FilePart>,
}

impl NewsDraft {
    /// Local checks performed before any request is built.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err(ApiError::Validation(
                "Please provide a title and content for the story.".to_string(),
            ));
        }
        if let Some(ref thumbnail) = self.thumbnail {
            thumbnail.validate(THUMBNAIL_TYPES)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: i64, status: NewsStatus, user_id: Option<i64>) -> NewsStory {
        NewsStory {
            id,
            title: format!("story {}", id),
            content: None,
            thumbnail: None,
            status,
            user_id: user_id.map(UserId::new),
            created_at: None,
        }
    }

    #[test]
    fn test_bucket_stories_by_ownership() {
        let stories = vec![
            story(1, NewsStatus::Admin, None),
            story(2, NewsStatus::User, Some(42)),
            story(3, NewsStatus::User, Some(7)),
            story(4, NewsStatus::User, None),
        ];

        let buckets = bucket_stories(stories, Some(UserId::new(42)));
        assert_eq!(buckets.admin.len(), 1);
        assert_eq!(buckets.mine.len(), 1);
        assert_eq!(buckets.mine[0].id, 2);
        assert_eq!(buckets.others.len(), 2);
    }

    #[test]
    fn test_bucket_stories_without_session_owns_nothing() {
        let stories = vec![
            story(1, NewsStatus::User, Some(42)),
            story(2, NewsStatus::User, None),
        ];

        let buckets = bucket_stories(stories, None);
        assert!(buckets.mine.is_empty());
        assert_eq!(buckets.others.len(), 2);
    }

    #[test]
    fn test_status_parses_unknown_as_user() {
        let parsed: NewsStatus = serde_json::from_str("\"featured\"").expect("parse status");
        assert_eq!(parsed, NewsStatus::User);
        let admin: NewsStatus = serde_json::from_str("\"admin\"").expect("parse admin");
        assert_eq!(admin, NewsStatus::Admin);
    }

    #[test]
    fn test_story_parses_string_user_id() {
        let json = r#"{"id": 9, "title": "t", "status": "user", "user_id": "42"}"#;
        let parsed: NewsStory = serde_json::from_str(json).expect("parse story");
        assert!(parsed.is_mine(UserId::new(42)));
    }

    #[test]
    fn test_thumbnail_url_resolution() {
        let mut s = story(1, NewsStatus::Admin, None);
        s.thumbnail = Some("pic.jpg".to_string());
        assert_eq!(
            s.thumbnail_url("https://example.org"),
            Some("https://example.org/uploads/pic.jpg".to_string())
        );

        s.thumbnail = Some("https://cdn.example.org/pic.jpg".to_string());
        assert_eq!(
            s.thumbnail_url("https://example.org"),
            Some("https://cdn.example.org/pic.jpg".to_string())
        );

        s.thumbnail = None;
        assert_eq!(s.thumbnail_url("https://example.org"), None);
    }

    #[test]
    fn test_draft_requires_title_and_content() {
        let draft = NewsDraft {
            title: "  ".to_string(),
            content: "body".to_string(),
            thumbnail: None,
        };
        assert!(matches!(draft.validate(), Err(ApiError::Validation(_))));
    }
}
