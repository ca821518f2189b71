//! Auth client integration tests
//!
//! Tests the `AuthClient` login/register flows against a `wiremock` mock
//! server, plus the hand-off from a successful login into a `TokenStore`.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bitebot::auth::{AuthClient, FileTokenStore, MemoryTokenStore, TokenStore};
use bitebot::error::ChatError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Construct an `AuthClient` pointing at the given wiremock base URL.
fn make_client(base_url: &str) -> AuthClient {
    AuthClient::new(base_url, Duration::from_secs(5)).expect("client should build")
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// A successful login is form-encoded and yields the issued token.
#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-abc",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let token = client
        .login("alice", "secret")
        .await
        .expect("login should succeed");

    assert_eq!(token.token, "tok-abc");
    assert_eq!(token.username, "alice");
}

/// Rejected credentials map to `AuthRequired`.
#[tokio::test]
async fn test_login_rejected_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let error = client
        .login("alice", "wrong")
        .await
        .expect_err("401 must be an error");

    assert!(matches!(error, ChatError::AuthRequired));
}

/// A malformed login request surfaces the server's detail verbatim.
#[tokio::test]
async fn test_login_validation_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"detail": "username is required"})),
        )
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let error = client
        .login("", "secret")
        .await
        .expect_err("422 must be an error");

    match error {
        ChatError::Validation { detail } => assert_eq!(detail, "username is required"),
        other => panic!("expected Validation, got: {:?}", other),
    }
}

/// An unreachable auth service maps to `Network`.
#[tokio::test]
async fn test_login_network_failure() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = make_client(&uri);
    let error = client
        .login("alice", "secret")
        .await
        .expect_err("refused connection must be an error");

    assert!(matches!(error, ChatError::Network(_)));
}

/// A login result flows into a token store and back out.
#[tokio::test]
async fn test_login_token_persists_through_store() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-xyz",
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let token = client
        .login("alice", "secret")
        .await
        .expect("login should succeed");

    let store = MemoryTokenStore::new();
    store.save(&token).expect("save should succeed");

    let loaded = store.load().expect("load should succeed").expect("token");
    assert_eq!(loaded.token, "tok-xyz");
    assert_eq!(loaded.username, "alice");
}

/// The file-backed store round-trips a login result through disk.
#[tokio::test]
async fn test_login_token_persists_through_file_store() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-disk",
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let token = client
        .login("alice", "secret")
        .await
        .expect("login should succeed");

    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileTokenStore::with_path(dir.path().join("session.json"));
    store.save(&token).expect("save should succeed");

    let loaded = store.load().expect("load should succeed").expect("token");
    assert_eq!(loaded.token, "tok-disk");

    store.clear().expect("clear should succeed");
    assert!(store.load().expect("load should succeed").is_none());
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// A successful registration posts JSON credentials and resolves to unit.
#[tokio::test]
async fn test_register_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/register"))
        .and(body_json(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"status": "created"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    client
        .register("alice", "alice@example.com", "secret")
        .await
        .expect("register should succeed");
}

/// A duplicate registration surfaces the server's detail verbatim.
#[tokio::test]
async fn test_register_duplicate_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/register"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"detail": "This username is already taken"})),
        )
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let error = client
        .register("alice", "alice@example.com", "secret")
        .await
        .expect_err("400 must be an error");

    match error {
        ChatError::Validation { detail } => {
            assert_eq!(detail, "This username is already taken");
        }
        other => panic!("expected Validation, got: {:?}", other),
    }
}
