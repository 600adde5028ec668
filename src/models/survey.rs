//! Surveys and survey responses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Placeholder recorded for questions the member left blank.
pub const NO_RESPONSE: &str = "No response";

#[derive(Debug, Clone, Deserialize)]
pub struct Survey {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyAnswer {
    pub question: String,
    pub answer: String,
}

/// Payload for the survey response endpoint. Answers are submitted for
/// every question in the survey, in order, so the backend never has to
/// reconcile a partial answer set.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyResponse {
    pub name: String,
    pub email: String,
    pub answers: Vec<SurveyAnswer>,
    pub survey_id: i64,
}

impl SurveyResponse {
    pub fn new(
        survey: &Survey,
        name: impl Into<String>,
        email: impl Into<String>,
        answered: &HashMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            answers: build_answers(&survey.questions, answered),
            survey_id: survey.id,
        }
    }
}

/// Pair every survey question with its answer, defaulting blanks.
pub fn build_answers(
    questions: &[String],
    answered: &HashMap<String, String>,
) -> Vec<SurveyAnswer> {
    questions
        .iter()
        .map(|question| SurveyAnswer {
            question: question.clone(),
            answer: answered
                .get(question)
                .filter(|a| !a.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| NO_RESPONSE.to_string()),
        })
        .collect()
}
