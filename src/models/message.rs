//! Messages exchanged between members and administrators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// A message as stored by the backend. Inbox entries are keyed to the
/// member's phone number, which is why attribution rides on the session.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A message being composed for the administrators.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub name: String,
    pub phone: String,
    pub message: String,
}

impl NewMessage {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.phone.trim().is_empty() || self.message.trim().is_empty() {
            return Err(ApiError::Validation(
                "Please enter your phone number and message.".to_string(),
            ));
        }
        Ok(())
    }
}
