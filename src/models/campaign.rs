//! Fundraising campaign models.

use serde::Deserialize;

use crate::models::resolve_upload_url;

#[derive(Debug, Clone, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub raised_amount: f64,
    #[serde(default)]
    pub target_amount: f64,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Campaign {
    /// Fraction of the target raised so far, clamped to [0, 1].
    /// A campaign without a target reports no progress.
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            0.0
        } else {
            (self.raised_amount / self.target_amount).clamp(0.0, 1.0)
        }
    }

    pub fn thumbnail_url(&self, base_url: &str) -> Option<String> {
        self.thumbnail
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| resolve_upload_url(base_url, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(raised: f64, target: f64) -> Campaign {
        Campaign {
            id: 1,
            title: "Roof repair".to_string(),
            description: None,
            raised_amount: raised,
            target_amount: target,
            thumbnail: None,
        }
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(campaign(50.0, 200.0).progress(), 0.25);
        assert_eq!(campaign(500.0, 200.0).progress(), 1.0);
        assert_eq!(campaign(50.0, 0.0).progress(), 0.0);
    }

    #[test]
    fn test_missing_amounts_default_to_zero() {
        let json = r#"{"id": 1, "title": "t"}"#;
        let parsed: Campaign = serde_json::from_str(json).expect("parse campaign");
        assert_eq!(parsed.raised_amount, 0.0);
        assert_eq!(parsed.progress(), 0.0);
    }
}
