//! Integration tests for the scheduler client using wiremock.
//!
//! Cover auth query parameters, the outgoing timezone contract, retry
//! classification, 404 semantics, and strict response parsing.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lotline_metricool::{
    CreatePostRequest, MetricoolClient, MetricoolConfig, MetricoolError, RetryConfig,
};

fn client_for(server: &MockServer, retry: RetryConfig) -> MetricoolClient {
    let config = MetricoolConfig::new("token-123", "user-1", "blog-9")
        .with_base_url(server.uri())
        .with_retry(retry);
    MetricoolClient::new(config).unwrap()
}

fn sample_request() -> CreatePostRequest {
    CreatePostRequest::new(
        "facebook",
        "New arrival! ABC-123 just hit the lot",
        vec!["https://cdn.example.com/1.jpg".to_string()],
        true,
        Utc.with_ymd_and_hms(2026, 3, 15, 14, 30, 0).unwrap(),
    )
}

// ============================================================================
// Auth and payload contract
// ============================================================================

#[tokio::test]
async fn test_auth_query_params_attached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/scheduler/posts"))
        .and(query_param("userToken", "token-123"))
        .and(query_param("userId", "user-1"))
        .and(query_param("blogId", "blog-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    client.create_post(&sample_request()).await.unwrap();
}

#[tokio::test]
async fn test_create_sends_utc_timezone_and_no_autopublish() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/scheduler/posts"))
        .and(body_partial_json(json!({
            "autoPublish": false,
            "publicationDate": {
                "dateTime": "2026-03-15T14:30:00",
                "timezone": "UTC",
            },
            "providers": [{"network": "facebook"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let post = client.create_post(&sample_request()).await.unwrap();
    assert_eq!(post.id, 7);
}

// ============================================================================
// Create response handling
// ============================================================================

#[tokio::test]
async fn test_create_missing_id_is_failure_despite_2xx() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/scheduler/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let err = client.create_post(&sample_request()).await.unwrap_err();
    assert!(matches!(err, MetricoolError::MissingPostId));
}

#[tokio::test]
async fn test_create_echoes_provider_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/scheduler/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "draft": true,
            "text": "New arrival! ABC-123 just hit the lot",
            "providers": [{"network": "facebook", "status": "PENDING"}],
            "publicationDate": {"dateTime": "2026-03-15T09:30:00"},
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let post = client.create_post(&sample_request()).await.unwrap();
    assert_eq!(post.provider_status(), Some("PENDING"));
    assert_eq!(post.network(), Some("facebook"));
}

#[tokio::test]
async fn test_malformed_response_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/scheduler/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::fast(3));
    let err = client.create_post(&sample_request()).await.unwrap_err();
    assert!(matches!(err, MetricoolError::MalformedResponse { .. }));
}

// ============================================================================
// Retry classification
// ============================================================================

#[tokio::test]
async fn test_client_error_surfaces_immediately_with_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/scheduler/posts"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"error": "text too long"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::fast(3));
    let err = client.create_post(&sample_request()).await.unwrap_err();
    match err {
        MetricoolError::Api { status, body } => {
            assert_eq!(status, 422);
            assert!(body.contains("text too long"));
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_retried_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/scheduler/posts"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/scheduler/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::fast(3));
    let post = client.create_post(&sample_request()).await.unwrap();
    assert_eq!(post.id, 42);
}

#[tokio::test]
async fn test_rate_limit_exhaustion_surfaces_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/scheduler/posts"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3) // initial call + 2 retries
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::fast(2));
    let err = client.create_post(&sample_request()).await.unwrap_err();
    assert!(matches!(err, MetricoolError::RateLimited { attempts: 3 }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_server_error_exhaustion_surfaces_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/scheduler/posts/42"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::fast(1));
    let err = client.get_post(42).await.unwrap_err();
    match err {
        MetricoolError::Unavailable { message } => assert!(message.contains("maintenance")),
        other => panic!("Expected Unavailable, got {other:?}"),
    }
}

// ============================================================================
// 404 semantics
// ============================================================================

#[tokio::test]
async fn test_delete_treats_404_as_success() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/scheduler/posts/42"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    assert!(client.delete_post(42).await.is_ok());
}

#[tokio::test]
async fn test_delete_other_errors_surface() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/scheduler/posts/42"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let err = client.delete_post(42).await.unwrap_err();
    assert!(matches!(err, MetricoolError::Api { status: 403, .. }));
}

#[tokio::test]
async fn test_get_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/scheduler/posts/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let err = client.get_post(99).await.unwrap_err();
    assert!(matches!(err, MetricoolError::NotFound { id: 99 }));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_posts_skips_entries_without_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/scheduler/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "text": "ABC-123", "providers": [{"network": "facebook"}]},
            {"text": "listed without an id"},
            {"id": 2, "text": "XYZ-999", "providers": [{"network": "linkedin"}]},
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let posts = client.list_posts().await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, 1);
    assert_eq!(posts[1].id, 2);
}
