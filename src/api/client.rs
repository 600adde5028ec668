//! HTTP client for the Our New Hope backend.
//!
//! All network traffic goes through `ApiClient`. Each endpoint method
//! declares whether it needs the session token; authenticated calls
//! fail fast with `ApiError::NotAuthenticated` when no session is held,
//! and a 401 on any of them forces the shared session out exactly once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{PendingRegistration, SessionManager};
use crate::config::Config;
use crate::models::{
    bucket_stories, Campaign, Message, NewMessage, NewsBuckets, NewsDraft, NewsStory, Profile,
    ProfileUpdate, Role, SkillsEntry, SkillsSubmission, Survey, SurveyResponse, UserId,
};

use super::ApiError;

/// Whether an endpoint requires the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Required,
    Public,
}

/// API client for the Our New Hope backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<SessionManager>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Build a request, attaching the bearer token when the endpoint
    /// needs one. With no session held, authenticated requests fail
    /// here without touching the network.
    fn request(&self, method: Method, path: &str, auth: Auth) -> Result<RequestBuilder, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, &url);
        match auth {
            Auth::Public => Ok(builder),
            Auth::Required => {
                let session = self.session.current().ok_or(ApiError::NotAuthenticated)?;
                Ok(builder.bearer_auth(session.token))
            }
        }
    }

    /// Check a response, classifying failures.
    /// A 401 on an authenticated endpoint means the token is no longer
    /// honored; the shared session is forced out before returning.
    async fn check_response(
        &self,
        response: reqwest::Response,
        auth: Auth,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Required {
            if self.session.force_sign_out() {
                warn!("backend rejected the session token");
            }
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
        serde_json::from_str(text).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, auth)?.send().await?;
        let response = self.check_response(response, auth).await?;
        let text = response.text().await?;
        Self::parse_json(&text)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::POST, path, auth)?
            .json(body)
            .send()
            .await?;
        let response = self.check_response(response, auth).await?;
        let text = response.text().await?;
        Self::parse_json(&text)
    }

    /// Send a JSON body and discard the response body.
    async fn send_empty<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<(), ApiError> {
        let response = self
            .request(method, path, auth)?
            .json(body)
            .send()
            .await?;
        self.check_response(response, auth).await?;
        Ok(())
    }

    async fn send_multipart(
        &self,
        method: Method,
        path: &str,
        form: Form,
        auth: Auth,
    ) -> Result<(), ApiError> {
        let response = self
            .request(method, path, auth)?
            .multipart(form)
            .send()
            .await?;
        self.check_response(response, auth).await?;
        Ok(())
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Exchange credentials for a token. Called by the session manager,
    /// which owns persisting the result; nothing else should call this.
    pub(crate) async fn login_exchange(
        &self,
        phone_number: &str,
        password: &str,
    ) -> Result<LoginExchange, ApiError> {
        if phone_number.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Please enter your phone number and password.".to_string(),
            ));
        }

        let body = LoginRequest {
            phone_number,
            password,
        };
        let response = self
            .request(Method::POST, "/mobile/login", Auth::Public)?
            .json(&body)
            .send()
            .await?;

        // A 401 here means the credentials are wrong, not that a held
        // session expired.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::InvalidCredentials);
        }

        let response = self.check_response(response, Auth::Public).await?;
        let text = response.text().await?;
        let exchange: LoginExchange = Self::parse_json(&text)?;
        debug!(user_id = %exchange.user_id, "login exchange succeeded");
        Ok(exchange)
    }

    /// Create an account. The backend sends a one-time code to the
    /// phone number; the returned registration state carries what the
    /// verify step needs. No session is minted until the member logs in.
    pub async fn register(
        &self,
        name: &str,
        phone_number: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<PendingRegistration, ApiError> {
        if name.trim().is_empty() || phone_number.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Please fill out name, phone number, and password.".to_string(),
            ));
        }

        let body = RegisterRequest {
            name,
            phone_number,
            password,
            email,
        };
        self.send_empty(Method::POST, "/mobile/register", &body, Auth::Public)
            .await?;

        Ok(PendingRegistration {
            phone_number: phone_number.to_string(),
            email: email.map(str::to_string),
        })
    }

    /// Confirm the one-time code sent during registration.
    pub async fn verify_otp(
        &self,
        pending: &PendingRegistration,
        otp_code: &str,
    ) -> Result<(), ApiError> {
        if otp_code.trim().is_empty() {
            return Err(ApiError::Validation(
                "Please enter the code you received.".to_string(),
            ));
        }

        let body = VerifyOtpRequest {
            phone_number: &pending.phone_number,
            otp_code: otp_code.trim(),
            email: pending.email.as_deref(),
        };
        self.send_empty(Method::POST, "/mobile/verify-otp", &body, Auth::Public)
            .await
    }

    // ========================================================================
    // News
    // ========================================================================

    /// Fetch the full news feed. Requires a session.
    pub async fn fetch_news(&self) -> Result<Vec<NewsStory>, ApiError> {
        self.get_json("/news", Auth::Required).await
    }

    /// Fetch the news feed split into the sections the news screen
    /// shows: admin stories, the member's own, and everyone else's.
    pub async fn fetch_news_buckets(&self) -> Result<NewsBuckets, ApiError> {
        let current_user = self.session.current().map(|s| s.user_id);
        let stories = self.fetch_news().await?;
        Ok(bucket_stories(stories, current_user))
    }

    /// Fetch a single story. Story pages are shareable, so no session
    /// is needed.
    pub async fn fetch_news_story(&self, id: i64) -> Result<NewsStory, ApiError> {
        self.get_json(&format!("/news/{}", id), Auth::Public).await
    }

    /// Publish a member story, with an optional thumbnail image.
    pub async fn create_news(&self, draft: NewsDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let form = Self::news_form(draft)?;
        self.send_multipart(Method::POST, "/user/news", form, Auth::Required)
            .await
    }

    /// Update one of the member's own stories.
    pub async fn update_news(&self, id: i64, draft: NewsDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let form = Self::news_form(draft)?;
        self.send_multipart(
            Method::PATCH,
            &format!("/user/news/{}", id),
            form,
            Auth::Required,
        )
        .await
    }

    /// Delete one of the member's own stories.
    pub async fn delete_news(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/user/news/{}", id), Auth::Required)?
            .send()
            .await?;
        self.check_response(response, Auth::Required).await?;
        Ok(())
    }

    fn news_form(draft: NewsDraft) -> Result<Form, ApiError> {
        let mut form = Form::new()
            .text("title", draft.title)
            .text("content", draft.content);
        if let Some(thumbnail) = draft.thumbnail {
            form = form.part("thumbnail", thumbnail.into_part()?);
        }
        Ok(form)
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Send a message to the administrators.
    pub async fn send_message(&self, message: &NewMessage) -> Result<(), ApiError> {
        message.validate()?;
        self.send_empty(Method::POST, "/messages", message, Auth::Public)
            .await
    }

    /// Fetch the messages sent from a phone number. The inbox is keyed
    /// to the member's verified number.
    pub async fn fetch_messages(&self, phone: &str) -> Result<Vec<Message>, ApiError> {
        let response = self
            .request(Method::GET, "/messages", Auth::Public)?
            .query(&[("phone", phone)])
            .send()
            .await?;
        let response = self.check_response(response, Auth::Public).await?;
        let text = response.text().await?;
        Self::parse_json(&text)
    }

    pub async fn delete_message(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/messages/{}", id), Auth::Public)?
            .send()
            .await?;
        self.check_response(response, Auth::Public).await?;
        Ok(())
    }

    // ========================================================================
    // Surveys and campaigns
    // ========================================================================

    pub async fn fetch_surveys(&self) -> Result<Vec<Survey>, ApiError> {
        self.get_json("/surveys", Auth::Public).await
    }

    /// Submit a completed survey. The response carries an answer for
    /// every question; blanks are recorded as "No response".
    pub async fn submit_survey_response(&self, response: &SurveyResponse) -> Result<(), ApiError> {
        self.send_empty(Method::POST, "/surveyresponses", response, Auth::Public)
            .await
    }

    pub async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, ApiError> {
        self.get_json("/campaigns", Auth::Public).await
    }

    // ========================================================================
    // Skills directory
    // ========================================================================

    pub async fn fetch_skills(&self) -> Result<Vec<SkillsEntry>, ApiError> {
        self.get_json("/skills-directory", Auth::Public).await
    }

    /// Submit a skills directory entry with the attached resume.
    /// The file is validated locally before any bytes go out.
    pub async fn submit_skills(&self, submission: SkillsSubmission) -> Result<(), ApiError> {
        submission.validate()?;
        let form = Self::skills_form(submission)?;
        self.send_multipart(Method::POST, "/skills-directory", form, Auth::Public)
            .await
    }

    pub async fn update_skills(
        &self,
        id: i64,
        submission: SkillsSubmission,
    ) -> Result<(), ApiError> {
        submission.validate()?;
        let form = Self::skills_form(submission)?;
        self.send_multipart(
            Method::PATCH,
            &format!("/skills-directory/{}", id),
            form,
            Auth::Public,
        )
        .await
    }

    fn skills_form(submission: SkillsSubmission) -> Result<Form, ApiError> {
        Ok(Form::new()
            .text("name", submission.name)
            .text("email", submission.email)
            .text("address", submission.address)
            .text(
                "date_of_birth",
                submission.date_of_birth.format("%Y-%m-%d").to_string(),
            )
            .text("skills", submission.skills)
            .part("resume", submission.resume.into_part()?))
    }

    // ========================================================================
    // Profile
    // ========================================================================

    /// Fetch the signed-in member's profile.
    pub async fn fetch_profile(&self) -> Result<Profile, ApiError> {
        let user_id = self.current_user_id()?;
        self.get_json(&format!("/mobileusers/{}", user_id), Auth::Required)
            .await
    }

    /// Update the signed-in member's profile. The password field is
    /// only sent when a new one was entered.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        if update.name.trim().is_empty() || update.phone_number.trim().is_empty() {
            return Err(ApiError::Validation(
                "Name and phone number cannot be empty.".to_string(),
            ));
        }
        let user_id = self.current_user_id()?;
        self.send_empty(
            Method::PATCH,
            &format!("/mobileusers/{}", user_id),
            update,
            Auth::Required,
        )
        .await
    }

    fn current_user_id(&self) -> Result<UserId, ApiError> {
        self.session
            .current()
            .map(|s| s.user_id)
            .ok_or(ApiError::NotAuthenticated)
    }
}

// Wire types for the authentication endpoints

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    phone_number: &'a str,
    password: &'a str,
}

/// What a successful login returns. The user id arrives as a number or
/// a string depending on the backend path; `UserId` normalizes both.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginExchange {
    pub(crate) token: String,
    pub(crate) user_id: UserId,
    #[serde(default)]
    pub(crate) role: Role,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    phone_number: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct VerifyOtpRequest<'a> {
    phone_number: &'a str,
    otp_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_exchange_parses_string_user_id() {
        let json = r#"{"token": "abc", "user_id": "42", "role": "admin"}"#;
        let exchange: LoginExchange = serde_json::from_str(json).expect("parse");
        assert_eq!(exchange.user_id, UserId::new(42));
        assert!(exchange.role.is_admin());
    }

    #[test]
    fn test_login_exchange_defaults_missing_role() {
        let json = r#"{"token": "abc", "user_id": 7}"#;
        let exchange: LoginExchange = serde_json::from_str(json).expect("parse");
        assert_eq!(exchange.role, Role::User);
    }

    #[test]
    fn test_verify_otp_request_omits_absent_email() {
        let body = VerifyOtpRequest {
            phone_number: "+23276000000",
            otp_code: "123456",
            email: None,
        };
        let json = serde_json::to_string(&body).expect("serialize");
        assert!(!json.contains("email"));
    }
}
