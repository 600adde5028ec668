//! Data models for the Our New Hope backend.
//!
//! This module contains the data structures the client exchanges with
//! the backend, plus the small pieces of pure logic the screens share:
//!
//! - `UserId`, `Role`, `Profile`: identity and account types
//! - `NewsStory`, `NewsBuckets`: the news feed and its ownership split
//! - `Message`, `NewMessage`: member-to-admin messaging
//! - `Survey`, `SurveyResponse`: surveys and their answer payloads
//! - `Campaign`: fundraising campaigns with progress tracking
//! - `SkillsEntry`, `SkillsSubmission`: the community skills directory

pub mod campaign;
pub mod message;
pub mod news;
pub mod skills;
pub mod survey;
pub mod user;

pub use campaign::Campaign;
pub use message::{Message, NewMessage};
pub use news::{bucket_stories, NewsBuckets, NewsDraft, NewsStatus, NewsStory};
pub use skills::{SkillsEntry, SkillsSubmission};
pub use survey::{build_answers, Survey, SurveyAnswer, SurveyResponse, NO_RESPONSE};
pub use user::{Profile, ProfileUpdate, Role, UserId};

/// Resolve a stored media reference against the backend's uploads
/// directory unless it is already an absolute URL.
pub fn resolve_upload_url(base_url: &str, value: &str) -> String {
    if value.starts_with("http://") || value.starts_with("https://") {
        value.to_string()
    } else {
        format!(
            "{}/uploads/{}",
            base_url.trim_end_matches('/'),
            value.trim_start_matches('/')
        )
    }
}
