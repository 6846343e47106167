//! Integration tests using mock HTTP server
//!
//! Tests the full flow: connection config → factory → decorated client → HTTP requests

use gitlab_factory::http::BackoffPolicy;
use gitlab_factory::types::BackoffType;
use gitlab_factory::{
    AuthenticatorRegistry, CacheManager, ClientFactory, ConnectionConfig, ConnectionManager,
    LayerKind,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn factory() -> ClientFactory {
    ClientFactory::new(
        AuthenticatorRegistry::new(),
        Some(Arc::new(CacheManager::new())),
    )
    .with_backoff_policy(BackoffPolicy::default().backoff(
        BackoffType::Constant,
        Duration::from_millis(5),
        Duration::from_millis(5),
    ))
}

fn config(server: &MockServer, value: Value) -> ConnectionConfig {
    ConnectionConfig::from_value(value)
        .unwrap()
        .with("url", server.uri())
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_oauth_token_sent_as_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .and(header("Authorization", "Bearer oauth-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "alice"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = factory()
        .make(&config(&mock_server, json!({"method": "token", "token": "oauth-token"})))
        .unwrap();
    let user: Value = client.http_client().get_json("user").await.unwrap();

    assert_eq!(user["username"], "alice");
}

#[tokio::test]
async fn test_private_token_with_sudo() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .and(header("PRIVATE-TOKEN", "glpat-123"))
        .and(header("Sudo", "bob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = factory()
        .make(&config(
            &mock_server,
            json!({"method": "http_token", "token": "glpat-123", "sudo": "bob"}),
        ))
        .unwrap();
    let projects: Vec<Value> = client.http_client().get_json("projects").await.unwrap();

    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn test_job_token_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/job"))
        .and(header("JOB-TOKEN", "ci-job"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = factory()
        .make(&config(&mock_server, json!({"method": "job_token", "token": "ci-job"})))
        .unwrap();
    let job: Value = client.http_client().get_json("job").await.unwrap();

    assert_eq!(job["id"], 42);
}

#[tokio::test]
async fn test_none_sends_no_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "17.0"})))
        .mount(&mock_server)
        .await;

    let client = factory()
        .make(&config(&mock_server, json!({"method": "none"})))
        .unwrap();
    client.http_client().get("version").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
    assert!(!requests[0].headers.contains_key("private-token"));
}

// ============================================================================
// Decorators
// ============================================================================

#[tokio::test]
async fn test_cached_get_hits_server_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = factory()
        .make(&config(
            &mock_server,
            json!({"method": "token", "token": "t", "cache": true, "backoff": false}),
        ))
        .unwrap();
    assert_eq!(client.http_client().layers(), &[LayerKind::Cache]);

    let config = gitlab_factory::http::RequestConfig::new().query("page", "1");
    let first = client
        .http_client()
        .get_with_config("projects", config.clone())
        .await
        .unwrap();
    let second = client
        .http_client()
        .get_with_config("projects", config)
        .await
        .unwrap();

    assert_eq!(first.text(), second.text());
}

#[tokio::test]
async fn test_backoff_retries_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&mock_server)
        .await;

    let client = factory()
        .make(&config(&mock_server, json!({"method": "token", "token": "t"})))
        .unwrap();
    let user: Value = client.http_client().get_json("user").await.unwrap();

    assert_eq!(user["id"], 1);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_backoff_disabled_does_not_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = factory()
        .make(&config(
            &mock_server,
            json!({"method": "token", "token": "t", "backoff": false}),
        ))
        .unwrap();
    let response = client.http_client().get("user").await.unwrap();

    assert_eq!(response.status.as_u16(), 503);
    assert!(client.http_client().layers().is_empty());
}

#[tokio::test]
async fn test_backoff_retry_count_from_config() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = factory()
        .make(&config(
            &mock_server,
            json!({"method": "token", "token": "t", "backoff": 1}),
        ))
        .unwrap();
    let err = client.http_client().get_json::<Value>("user").await.unwrap_err();

    assert!(err.is_retryable());
}

// ============================================================================
// Connection manager
// ============================================================================

#[tokio::test]
async fn test_manager_from_yaml_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/groups"))
        .and(header("PRIVATE-TOKEN", "secondary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let yaml = format!(
        r"
default: primary
connections:
  primary:
    method: token
    token: primary
  secondary:
    method: http_token
    token: secondary
    url: {}
    cache: true
",
        mock_server.uri()
    );
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let mut manager = ConnectionManager::from_file(factory(), file.path()).unwrap();
    assert_eq!(manager.default_connection(), "primary");

    let client = manager.connection(Some("secondary")).unwrap();
    assert_eq!(
        client.http_client().layers(),
        &[LayerKind::Cache, LayerKind::Backoff]
    );

    let groups: Vec<Value> = client.http_client().get_json("groups").await.unwrap();
    assert!(groups.is_empty());
    let groups: Vec<Value> = client.http_client().get_json("groups").await.unwrap();
    assert!(groups.is_empty());
}
