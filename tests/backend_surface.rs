//! Integration tests for the backend surface: news, messages, surveys,
//! campaigns, registration, and error reporting.


use std::collections::HashMap;

use fixtures::{harness, signed_in_harness, TEST_PHONE, TEST_TOKEN};
use newhope_core::api::ApiError;
use newhope_core::auth::SessionState;
use newhope_core::models::{SurveyResponse, UserId, NO_RESPONSE};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_news_buckets_normalize_string_user_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "From the office", "status": "admin"},
            {"id": 2, "title": "My story", "status": "user", "user_id": "42"},
            {"id": 3, "title": "Their story", "status": "user", "user_id": 7},
        ])))
        .mount(&server)
        .await;

    let h = signed_in_harness(&server.uri());
    let buckets = h.api.fetch_news_buckets().await.expect("fetch buckets");

    assert_eq!(buckets.admin.len(), 1);
    assert_eq!(buckets.mine.len(), 1);
    assert_eq!(buckets.mine[0].id, 2);
    assert!(buckets.mine[0].is_mine(UserId::new(42)));
    assert_eq!(buckets.others.len(), 1);
}

#[tokio::test]
async fn test_fetch_news_without_session_fails_fast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let err = h.api.fetch_news().await.expect_err("no session");
    assert!(matches!(err, ApiError::NotAuthenticated));
}

#[tokio::test]
async fn test_messages_fetched_by_phone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .and(query_param("phone", TEST_PHONE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "phone": TEST_PHONE, "message": "Hello"},
            {"id": 2, "phone": TEST_PHONE, "message": "Any update?"},
        ])))
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let messages = h.api.fetch_messages(TEST_PHONE).await.expect("fetch");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].message, "Any update?");
}

#[tokio::test]
async fn test_survey_response_defaults_blank_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/surveyresponses"))
        .and(body_partial_json(json!({
            "survey_id": 3,
            "answers": [
                {"question": "How did you hear about us?", "answer": "Radio"},
                {"question": "Any suggestions?", "answer": NO_RESPONSE},
            ],
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/surveys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 3,
                "title": "Community feedback",
                "questions": ["How did you hear about us?", "Any suggestions?"],
            },
        ])))
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let surveys = h.api.fetch_surveys().await.expect("fetch surveys");
    let survey = &surveys[0];

    let mut answered = HashMap::new();
    answered.insert(
        "How did you hear about us?".to_string(),
        "Radio".to_string(),
    );
    let response = SurveyResponse::new(survey, "Aminata", "aminata@example.org", &answered);
    h.api
        .submit_survey_response(&response)
        .await
        .expect("submit response");
}

#[tokio::test]
async fn test_campaign_progress_and_thumbnail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "title": "Roof repair",
                "raised_amount": 50.0,
                "target_amount": 200.0,
                "thumbnail": "roof.jpg",
            },
        ])))
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let campaigns = h.api.fetch_campaigns().await.expect("fetch campaigns");
    let campaign = &campaigns[0];
    assert_eq!(campaign.progress(), 0.25);
    assert_eq!(
        campaign.thumbnail_url(h.api.base_url()),
        Some(format!("{}/uploads/roof.jpg", server.uri()))
    );
}

#[tokio::test]
async fn test_register_then_verify_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mobile/register"))
        .and(body_partial_json(json!({
            "name": "Aminata Kamara",
            "phone_number": TEST_PHONE,
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/verify-otp"))
        .and(body_partial_json(json!({
            "phone_number": TEST_PHONE,
            "otp_code": "123456",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let pending = h
        .api
        .register("Aminata Kamara", TEST_PHONE, "hunter2", None)
        .await
        .expect("register");
    h.api
        .verify_otp(&pending, "123456")
        .await
        .expect("verify otp");

    // Registration never mints a session; the member still logs in
    assert_eq!(h.session.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_server_error_message_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/surveys"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": "Survey window closed",
        })))
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let err = h.api.fetch_surveys().await.expect_err("server error");
    match err {
        ApiError::Server { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Survey window closed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_profile_round_trip_uses_session_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mobileusers/42"))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Aminata Kamara",
            "phone_number": TEST_PHONE,
        })))
        .mount(&server)
        .await;

    let h = signed_in_harness(&server.uri());
    let profile = h.api.fetch_profile().await.expect("fetch profile");
    assert_eq!(profile.name, "Aminata Kamara");
    assert_eq!(profile.phone_number, TEST_PHONE);
}
