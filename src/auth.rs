//! Auth service client and token persistence
//!
//! Login and registration talk to the separate user service, which issues
//! opaque bearer tokens. Token persistence goes through the [`TokenStore`]
//! trait so the embedding application decides where credentials live: the
//! CLI uses a JSON file under the platform data dir, tests use the in-memory
//! store.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use crate::client::classify_status;
use crate::error::{BitebotError, ChatError, Result};

/// Bearer credential held on behalf of a logged-in user
///
/// `issued_at` records when we obtained the token; the backend tokens are
/// opaque, so expiry is the server's call and a rejected request simply
/// surfaces as [`ChatError::AuthRequired`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    /// Opaque bearer token issued by the auth service
    pub token: String,
    /// Username the token was issued for
    pub username: String,
    /// UTC time the token was obtained
    pub issued_at: DateTime<Utc>,
}

impl StoredToken {
    /// Create a token record stamped with the current time
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            issued_at: Utc::now(),
        }
    }
}

/// Where bearer tokens are persisted between requests
///
/// The chat client never touches storage itself; callers load a token, pass
/// it into a request, and save whatever the server issues back.
pub trait TokenStore {
    /// Persist a token, replacing any previous one
    fn save(&self, token: &StoredToken) -> Result<()>;

    /// Load the stored token, if any
    fn load(&self) -> Result<Option<StoredToken>>;

    /// Remove the stored token
    fn clear(&self) -> Result<()>;
}

/// Token store backed by a JSON file under the user data dir
///
/// The native analog of the browser widget's localStorage slot: one small
/// file holding the current session token.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store at the default platform location
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be resolved.
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "bitebot", "bitebot").ok_or_else(|| {
            BitebotError::Config("Could not resolve a user data directory".to_string())
        })?;
        Ok(Self {
            path: dirs.data_dir().join("session.json"),
        })
    }

    /// Create a store at an explicit path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(token)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!("Stored session token at {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredToken>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)?;
        let token: StoredToken = serde_json::from_str(&json)?;
        Ok(Some(token))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory token store for tests and embedders
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<StoredToken>>,
}

impl MemoryTokenStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &StoredToken) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| BitebotError::Client("Token store lock poisoned".to_string()))?;
        *slot = Some(token.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredToken>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| BitebotError::Client("Token store lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| BitebotError::Client("Token store lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

/// Success body from `POST /users/login`
#[derive(Debug, Deserialize)]
struct LoginResponseBody {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

/// Request body for `POST /users/register`
#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Client for the user/auth service
///
/// Login uses the form-encoded flow the user service expects; registration
/// posts JSON. Both map failures into the same [`ChatError`] taxonomy as the
/// chat client.
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a client for the given auth service base URL
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bitebot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BitebotError::Client(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Exchange credentials for a bearer token
    ///
    /// # Errors
    ///
    /// * [`ChatError::AuthRequired`] when the credentials are rejected
    /// * [`ChatError::Validation`] on a malformed request, detail verbatim
    /// * [`ChatError::Network`] when the service is unreachable
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<StoredToken, ChatError> {
        let url = format!("{}/users/login", self.base_url);

        tracing::debug!("Logging in user {}", username);

        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Login request failed: {}", e);
                ChatError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), response).await);
        }

        let body: LoginResponseBody = response
            .json()
            .await
            .map_err(|e| ChatError::Protocol(format!("{}", e)))?;

        if let Some(token_type) = &body.token_type {
            tracing::debug!("Received {} token for {}", token_type, username);
        }

        Ok(StoredToken::new(body.access_token, username))
    }

    /// Create a new account on the user service
    ///
    /// A successful registration does not log the user in; call
    /// [`AuthClient::login`] afterwards.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> std::result::Result<(), ChatError> {
        let url = format!("{}/users/register", self.base_url);

        tracing::debug!("Registering user {}", username);

        let response = self
            .client
            .post(&url)
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Register request failed: {}", e);
                ChatError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), response).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_client_creation() {
        let client = AuthClient::new("http://localhost:8000", Duration::from_secs(30));
        assert!(client.is_ok());
    }

    #[test]
    fn test_stored_token_fields() {
        let token = StoredToken::new("abc123", "alice");
        assert_eq!(token.token, "abc123");
        assert_eq!(token.username, "alice");
    }

    #[test]
    fn test_stored_token_round_trips_through_json() {
        let token = StoredToken::new("abc123", "alice");
        let json = serde_json::to_string(&token).unwrap();
        let back: StoredToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_memory_store_save_load_clear() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&StoredToken::new("tok", "alice")).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token, "tok");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_save_replaces_previous() {
        let store = MemoryTokenStore::new();
        store.save(&StoredToken::new("old", "alice")).unwrap();
        store.save(&StoredToken::new("new", "alice")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().token, "new");
    }

    #[test]
    fn test_file_store_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::with_path(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::with_path(dir.path().join("nested").join("session.json"));

        store.save(&StoredToken::new("tok", "alice")).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token, "tok");
        assert_eq!(loaded.username, "alice");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::with_path(dir.path().join("session.json"));
        assert!(store.clear().is_ok());
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_login_response_body_parses() {
        let body: LoginResponseBody =
            serde_json::from_str(r#"{"access_token":"tok","token_type":"bearer"}"#).unwrap();
        assert_eq!(body.access_token, "tok");
        assert_eq!(body.token_type.as_deref(), Some("bearer"));
    }
}
