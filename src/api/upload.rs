//! Multipart file parts and pre-dispatch upload validation.
//!
//! Oversized or wrong-type files are rejected locally, before any
//! request is built, so a bad pick never costs the user an upload.

use std::path::Path;

use reqwest::multipart::Part;
use tracing::debug;

use super::ApiError;

/// Largest file accepted for any upload (resumes, thumbnails).
/// The backend enforces the same ceiling; rejecting locally saves the
/// round trip on mobile connections.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Document types accepted for resume uploads (PDF, DOC, DOCX).
pub const RESUME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Image types accepted for news and campaign thumbnails.
pub const THUMBNAIL_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// A file attached to a multipart submission.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk into a part.
    pub fn from_path(path: &Path, mime_type: impl Into<String>) -> Result<Self, ApiError> {
        let bytes = std::fs::read(path).map_err(|err| {
            ApiError::Validation(format!("failed to read {}: {}", path.display(), err))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, mime_type, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Reject oversized or disallowed files before any request is built.
    /// A file of exactly `MAX_UPLOAD_BYTES` is still accepted.
    pub fn validate(&self, allowed_types: &[&str]) -> Result<(), ApiError> {
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::Validation(format!(
                "The file is too large. Please upload a file smaller than {}MB.",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }
        if !allowed_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&self.mime_type))
        {
            return Err(ApiError::Validation(format!(
                "Invalid file type: {}.",
                self.mime_type
            )));
        }
        Ok(())
    }

    /// Convert into a reqwest multipart part. Callers validate first.
    pub(crate) fn into_part(self) -> Result<Part, ApiError> {
        debug!(file = %self.file_name, size = self.bytes.len(), "building multipart file part");
        let mime_type = self.mime_type;
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&mime_type)
            .map_err(|err| ApiError::Validation(format!("invalid MIME type {:?}: {}", mime_type, err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_ceiling_boundary() {
        let at_ceiling = FilePart::new("resume.pdf", "application/pdf", vec![0; MAX_UPLOAD_BYTES]);
        assert!(at_ceiling.validate(RESUME_TYPES).is_ok());

        let over = FilePart::new("resume.pdf", "application/pdf", vec![0; MAX_UPLOAD_BYTES + 1]);
        assert!(matches!(
            over.validate(RESUME_TYPES),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_disallowed_type_rejected() {
        let exe = FilePart::new("resume.exe", "application/x-msdownload", vec![0; 64]);
        assert!(matches!(
            exe.validate(RESUME_TYPES),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_mime_match_is_case_insensitive() {
        let pdf = FilePart::new("resume.pdf", "Application/PDF", vec![0; 64]);
        assert!(pdf.validate(RESUME_TYPES).is_ok());
    }

    #[test]
    fn test_image_not_valid_as_resume() {
        let jpeg = FilePart::new("photo.jpg", "image/jpeg", vec![0; 64]);
        assert!(jpeg.validate(RESUME_TYPES).is_err());
        assert!(jpeg.validate(THUMBNAIL_TYPES).is_ok());
    }
}
