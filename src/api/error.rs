use thiserror::Error;

use crate::auth::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("invalid phone number or password")]
    InvalidCredentials,

    #[error("session rejected - please log in again")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("another submission is already in progress")]
    InFlight,

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Fallback shown when the backend sent no usable message
const GENERIC_SERVER_MESSAGE: &str = "request failed";

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        // Back off to a character boundary
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Pull the backend's own message out of an error body when present.
    /// The backend reports failures as `{"error": "..."}`, occasionally
    /// `{"message": "..."}`.
    fn message_from_body(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        for key in ["error", "message"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                if !message.is_empty() {
                    return Some(message.to_string());
                }
            }
        }
        None
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }
        let message = Self::message_from_body(body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                GENERIC_SERVER_MESSAGE.to_string()
            } else {
                Self::truncate_body(body)
            }
        });
        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    }

    /// True for failures that mean the caller's credentials are the problem.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ApiError::NotAuthenticated | ApiError::InvalidCredentials | ApiError::Unauthorized
        )
    }
}
