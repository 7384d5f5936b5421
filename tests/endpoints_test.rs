use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use path2prep_client::core::endpoints::RegisterRequest;
use path2prep_client::domain::model::{
    ApplicationStatus, ApplicationUpdate, ProfileUpdate, ScholarshipQuery,
};
use path2prep_client::{
    ApiClient, ClientConfig, ClientError, FileTokenStore, MemoryTokenStore, RecordingNavigator,
    TokenSlot, TokenStore,
};
use serde_json::json;
use tempfile::TempDir;

fn without_authorization(req: &HttpMockRequest) -> bool {
    req.headers.as_ref().map_or(true, |headers| {
        !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("authorization"))
    })
}

fn without_ordering_param(req: &HttpMockRequest) -> bool {
    req.query_params
        .as_ref()
        .map_or(true, |params| !params.iter().any(|(name, _)| name == "ordering"))
}

fn client_for(
    server: &MockServer,
    store: &MemoryTokenStore,
) -> ApiClient<MemoryTokenStore, RecordingNavigator> {
    let config = ClientConfig::default().with_base_url(server.url("/api"));
    ApiClient::new(&config, store.clone(), RecordingNavigator::new()).expect("client should build")
}

fn user_json() -> serde_json::Value {
    json!({
        "id": 1,
        "username": "amina",
        "email": "amina@example.com",
        "full_name": "Amina Yusuf",
        "country": "Kenya",
        "age": 22,
        "role": "student",
        "is_email_verified": false
    })
}

fn scholarship_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Global Futures Scholarship",
        "organization": "Open Doors Foundation",
        "description": "Full funding for engineering graduate studies.",
        "eligibility": "GPA 3.0+",
        "deadline": "2026-12-01",
        "country": "Canada",
        "funding_amount": "Full tuition",
        "link": "https://example.org/global-futures",
        "is_approved": true,
        "is_active": true
    })
}

fn application_json(status: &str) -> serde_json::Value {
    json!({
        "id": 5,
        "user": 1,
        "scholarship": scholarship_json(3),
        "status": status,
        "notes": "",
        "created_at": "2026-10-01T08:30:00Z",
        "updated_at": "2026-10-02T09:00:00+00:00"
    })
}

#[tokio::test]
async fn test_login_persists_session() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::new();
    let client = client_for(&server, &store);

    let login_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/login/")
                .matches(without_authorization)
                .json_body(json!({"email": "amina@example.com", "password": "s3cret-pass"}));
            then.status(200).json_body(json!({
                "user": user_json(),
                "access": "access-1",
                "refresh": "refresh-1"
            }));
        })
        .await;

    let response = client.login(" amina@example.com ", "s3cret-pass").await?;

    login_mock.assert_async().await;
    assert_eq!(response.user.email, "amina@example.com");
    assert_eq!(store.read(TokenSlot::Access).await?.as_deref(), Some("access-1"));
    assert_eq!(store.read(TokenSlot::Refresh).await?.as_deref(), Some("refresh-1"));
    Ok(())
}

#[tokio::test]
async fn test_login_rejects_empty_credentials_locally() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::new();
    let client = client_for(&server, &store);

    let login_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login/");
            then.status(200);
        })
        .await;

    let error = client.login("", "pw").await.unwrap_err();

    assert!(matches!(error, ClientError::ValidationError { .. }));
    login_mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_register_persists_session() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::new();
    let client = client_for(&server, &store);

    let register_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/users/register/")
                .json_body(json!({
                    "username": "amina",
                    "email": "amina@example.com",
                    "password": "s3cret-pass",
                    "password_confirm": "s3cret-pass",
                    "country": "Kenya"
                }));
            then.status(201).json_body(json!({
                "user": user_json(),
                "access": "access-9",
                "refresh": "refresh-9"
            }));
        })
        .await;

    let registration = RegisterRequest {
        username: "amina".to_string(),
        email: "amina@example.com".to_string(),
        password: "s3cret-pass".to_string(),
        password_confirm: "s3cret-pass".to_string(),
        country: Some("Kenya".to_string()),
        ..Default::default()
    };
    client.register(&registration).await?;

    register_mock.assert_async().await;
    assert_eq!(store.read(TokenSlot::Access).await?.as_deref(), Some("access-9"));
    Ok(())
}

#[tokio::test]
async fn test_logout_revokes_and_clears_session() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::with_tokens(Some("access-1"), Some("refresh-1"));
    let client = client_for(&server, &store);

    let logout_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/users/logout/")
                .header("authorization", "Bearer access-1")
                .json_body(json!({"refresh_token": "refresh-1"}));
            then.status(205);
        })
        .await;

    client.logout().await?;

    logout_mock.assert_async().await;
    assert!(!client.has_session().await?);
    assert_eq!(store.read(TokenSlot::Refresh).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_logout_clears_session_even_when_request_fails() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::with_tokens(Some("access-1"), Some("refresh-1"));
    let client = client_for(&server, &store);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/users/logout/");
            then.status(500).body("Internal Server Error");
        })
        .await;

    let error = client.logout().await.unwrap_err();

    assert_eq!(error.user_friendly_message(), "Internal Server Error");
    assert_eq!(store.read(TokenSlot::Access).await?, None);
    assert_eq!(store.read(TokenSlot::Refresh).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_logout_without_refresh_token_skips_request() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::with_tokens(Some("access-1"), None);
    let client = client_for(&server, &store);

    let logout_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/users/logout/");
            then.status(205);
        })
        .await;

    client.logout().await?;

    logout_mock.assert_hits_async(0).await;
    assert_eq!(store.read(TokenSlot::Access).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_list_scholarships_sends_query_params() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::with_tokens(Some("access-1"), Some("refresh-1"));
    let client = client_for(&server, &store);

    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/scholarships/")
                .query_param("country", "Canada")
                .query_param("search", "engineering")
                .matches(without_ordering_param);
            then.status(200).json_body(json!({
                "count": 2,
                "next": null,
                "previous": null,
                "results": [scholarship_json(3), scholarship_json(4)]
            }));
        })
        .await;

    let query = ScholarshipQuery {
        country: Some("Canada".to_string()),
        search: Some("engineering".to_string()),
        ordering: None,
    };
    let page = client.list_scholarships(&query).await?;

    list_mock.assert_async().await;
    assert_eq!(page.count, 2);
    assert_eq!(page.results[1].id, 4);
    assert_eq!(
        page.results[0].deadline,
        chrono::NaiveDate::from_ymd_opt(2026, 12, 1)
    );
    Ok(())
}

#[tokio::test]
async fn test_match_scholarships_uses_requested_count() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::with_tokens(Some("access-1"), Some("refresh-1"));
    let client = client_for(&server, &store);

    let match_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/scholarships/match/")
                .json_body(json!({"top_k": 2}));
            then.status(200).json_body(json!({
                "matches": [
                    {"scholarship": scholarship_json(3), "relevance_score": 0.91, "method": "tfidf"},
                    {"scholarship": scholarship_json(4), "relevance_score": 0.47, "method": "tfidf"}
                ]
            }));
        })
        .await;

    let result = client.match_scholarships(Some(2)).await?;

    match_mock.assert_async().await;
    assert_eq!(result.matches.len(), 2);
    assert!(result.matches[0].relevance_score > result.matches[1].relevance_score);
    Ok(())
}

#[tokio::test]
async fn test_match_scholarships_rejects_out_of_range_count() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::with_tokens(Some("access-1"), Some("refresh-1"));
    let client = client_for(&server, &store);

    let match_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/scholarships/match/");
            then.status(200).json_body(json!({"matches": []}));
        })
        .await;

    assert!(client.match_scholarships(Some(0)).await.is_err());
    assert!(client.match_scholarships(Some(500)).await.is_err());
    match_mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_application_lifecycle() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::with_tokens(Some("access-1"), Some("refresh-1"));
    let client = client_for(&server, &store);

    let create_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/applications/")
                .json_body(json!({"scholarship_id": 3, "status": "not_started"}));
            then.status(201).json_body(application_json("not_started"));
        })
        .await;
    let update_mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/applications/5/")
                .json_body(json!({"status": "submitted", "notes": "Sent transcripts"}));
            then.status(200).json_body(application_json("submitted"));
        })
        .await;

    let created = client.create_application(3, None).await?;
    assert_eq!(created.status, ApplicationStatus::NotStarted);

    let update = ApplicationUpdate {
        status: Some(ApplicationStatus::Submitted),
        notes: Some("Sent transcripts".to_string()),
    };
    let updated = client.update_application(created.id, &update).await?;
    assert_eq!(updated.status, ApplicationStatus::Submitted);

    create_mock.assert_async().await;
    update_mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_bookmarks_and_notifications() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::with_tokens(Some("access-1"), Some("refresh-1"));
    let client = client_for(&server, &store);

    let bookmark_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/bookmarks/")
                .json_body(json!({"scholarship_id": 3}));
            then.status(201).json_body(json!({
                "id": 8,
                "user": 1,
                "scholarship": scholarship_json(3),
                "created_at": "2026-10-03T12:00:00Z"
            }));
        })
        .await;
    let delete_mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/bookmarks/8/");
            then.status(204);
        })
        .await;
    let read_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/notifications/12/mark_read/");
            then.status(200).json_body(json!({"status": "notification marked as read"}));
        })
        .await;
    let read_all_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/notifications/mark_all_read/");
            then.status(200).json_body(json!({"status": "all notifications marked as read"}));
        })
        .await;

    let bookmark = client.create_bookmark(3).await?;
    client.delete_bookmark(bookmark.id).await?;
    client.mark_notification_read(12).await?;
    client.mark_all_notifications_read().await?;

    bookmark_mock.assert_async().await;
    delete_mock.assert_async().await;
    read_mock.assert_async().await;
    read_all_mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_profile_update_sends_only_changed_fields() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::with_tokens(Some("access-1"), Some("refresh-1"));
    let client = client_for(&server, &store);

    let update_mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/profiles/me/")
                .json_body(json!({"target_country": "Germany", "gre_score": 318}));
            then.status(200).json_body(json!({
                "id": 11,
                "user": 1,
                "gpa": null,
                "target_country": "Germany",
                "gre_score": 318
            }));
        })
        .await;

    let update = ProfileUpdate {
        target_country: Some("Germany".to_string()),
        gre_score: Some(318),
        ..Default::default()
    };
    let profile = client.update_profile(&update).await?;

    update_mock.assert_async().await;
    assert_eq!(profile.target_country, "Germany");
    assert_eq!(profile.gpa, None);
    Ok(())
}

#[tokio::test]
async fn test_career_recommendations() -> Result<()> {
    let server = MockServer::start_async().await;
    let store = MemoryTokenStore::with_tokens(Some("access-1"), Some("refresh-1"));
    let client = client_for(&server, &store);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/recommend-career/recommend/");
            then.status(200).json_body(json!({
                "top_careers": [
                    {"career": "Data Scientist", "confidence": 0.82, "description": "Builds models", "category": "Technology"}
                ]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/recommend-career/my_recommendations/");
            then.status(200).json_body(json!([{
                "id": 1,
                "career": {
                    "id": 4,
                    "name": "Data Scientist",
                    "description": "Builds models",
                    "category": "Technology",
                    "required_skills": ["python", "statistics"],
                    "average_salary": "98000.00",
                    "growth_rate": "high"
                },
                "confidence_score": 0.82,
                "model_used": "random_forest",
                "rank": 1
            }]));
        })
        .await;

    let live = client.recommend_careers().await?;
    assert_eq!(live.top_careers[0].career, "Data Scientist");

    let history = client.my_recommendations().await?;
    assert_eq!(history[0].career.average_salary, Some(98000.0));
    assert_eq!(history[0].rank, 1);
    Ok(())
}

/// 以檔案保存的 session 可以跨 client 實例使用
#[tokio::test]
async fn test_file_store_session_survives_new_client() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let session_path = temp_dir.path().join("session.json");
    let server = MockServer::start_async().await;
    let config = ClientConfig::default().with_base_url(server.url("/api"));

    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login/");
            then.status(200).json_body(json!({
                "user": user_json(),
                "access": "access-1",
                "refresh": "refresh-1"
            }));
        })
        .await;
    let me_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/auth/users/me/")
                .header("authorization", "Bearer access-1");
            then.status(200).json_body(user_json());
        })
        .await;

    let first = ApiClient::new(
        &config,
        FileTokenStore::new(session_path.clone()),
        RecordingNavigator::new(),
    )?;
    first.login("amina@example.com", "s3cret-pass").await?;
    drop(first);

    let second = ApiClient::new(
        &config,
        FileTokenStore::new(session_path.clone()),
        RecordingNavigator::new(),
    )?;
    let user = second.current_user().await?;

    assert_eq!(user.id, 1);
    me_mock.assert_async().await;
    Ok(())
}
