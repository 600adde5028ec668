//! Skills directory models: listing entries and resume submissions.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::upload::{FilePart, RESUME_TYPES};
use crate::api::ApiError;

/// A published entry in the community skills directory.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillsEntry {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub resume: Option<String>,
}

/// A skills submission with an attached resume, validated locally
/// before any upload is attempted.
#[derive(Debug, Clone)]
pub struct SkillsSubmission {
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub skills: String,
    pub resume: FilePart,
}

impl SkillsSubmission {
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [&self.name, &self.email, &self.address, &self.skills];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(ApiError::Validation(
                "Please fill out all fields and attach a resume.".to_string(),
            ));
        }
        self.resume.validate(RESUME_TYPES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> SkillsSubmission {
        SkillsSubmission {
            name: "Aminata Kamara".to_string(),
            email: "aminata@example.org".to_string(),
            address: "12 Siaka Stevens St".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12).expect("valid date"),
            skills: "Carpentry, tailoring".to_string(),
            resume: FilePart::new("resume.pdf", "application/pdf", vec![1, 2, 3]),
        }
    }

    #[test]
    fn test_complete_submission_passes() {
        assert!(submission().validate().is_ok());
    }

    #[test]
    fn test_blank_field_rejected() {
        let mut s = submission();
        s.skills = "  ".to_string();
        assert!(matches!(s.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_wrong_resume_type_rejected() {
        let mut s = submission();
        s.resume = FilePart::new("resume.exe", "application/x-msdownload", vec![0; 16]);
        assert!(matches!(s.validate(), Err(ApiError::Validation(_))));
    }
}
