//! HTTP client, error taxonomy, and upload validation for the backend.

pub mod client;
pub mod error;
pub mod upload;

pub use client::ApiClient;
pub use error::ApiError;
pub use upload::{FilePart, MAX_UPLOAD_BYTES, RESUME_TYPES, THUMBNAIL_TYPES};
