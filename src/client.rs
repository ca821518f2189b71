//! HTTP client for the ordering-assistant backend
//!
//! This module implements the `/chat`, `/clear-session`, and `/health`
//! calls against the agent service. The client is stateless across calls:
//! the caller supplies the user id and optional bearer token on every
//! request and owns whatever token the server hands back. Transport and
//! status failures are normalized into the typed [`ChatError`] taxonomy so
//! the UI can branch without string matching.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BitebotError, ChatError, Result};

/// Request body for `POST /chat`
///
/// The token rides in the body for backward compatibility with servers that
/// read it there; when present it is ALSO sent as a bearer header (see
/// [`ChatClient::send_message`]).
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

/// Request body for `POST /clear-session`
#[derive(Debug, Serialize)]
struct ClearSessionRequest<'a> {
    user_id: &'a str,
}

/// Success body returned by `POST /chat`
#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    response: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    requires_auth: bool,
}

/// Error body shape shared by the agent and auth services
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Decoded reply from the assistant
///
/// `issued_token` is set when the server completed a login on the user's
/// behalf mid-conversation; persisting it is the caller's responsibility,
/// the client itself stores nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Raw reply text, ready for the formatting pipeline
    pub text: String,
    /// The server wants the user logged in before continuing
    pub requires_auth: bool,
    /// Fresh bearer token issued by the server, if any
    pub issued_token: Option<String>,
}

/// Health probe result from `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    /// Status string reported by the service
    #[serde(default)]
    pub status: String,
}

/// Stateless HTTP client for the assistant backend
///
/// # Examples
///
/// ```no_run
/// use bitebot::client::ChatClient;
/// use std::time::Duration;
///
/// # async fn example() -> bitebot::error::Result<()> {
/// let client = ChatClient::new("http://localhost:5000", Duration::from_secs(30))?;
/// let reply = client.send_message("Show restaurants", "guest", None).await;
/// # Ok(())
/// # }
/// ```
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    /// Create a client for the given agent base URL
    ///
    /// # Arguments
    ///
    /// * `base_url` - Agent service base, e.g. `http://localhost:5000`
    /// * `timeout` - Per-request timeout
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

        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!("Initialized chat client for {}", base_url);

        Ok(Self { client, base_url })
    }

    /// Agent base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one user message and return the assistant's reply
    ///
    /// When `token` is present it is transmitted twice: in the JSON body and
    /// as an `Authorization: Bearer` header, so servers reading either
    /// location authenticate the request.
    ///
    /// # Arguments
    ///
    /// * `message` - The user's chat message
    /// * `user_id` - Conversation owner on the server side
    /// * `token` - Optional bearer credential
    ///
    /// # Errors
    ///
    /// * [`ChatError::AuthRequired`] on 401/403
    /// * [`ChatError::Validation`] on other 4xx, detail taken from the server
    /// * [`ChatError::Upstream`] on 5xx
    /// * [`ChatError::Network`] when no response was received
    /// * [`ChatError::Protocol`] when a success body fails to decode
    pub async fn send_message(
        &self,
        message: &str,
        user_id: &str,
        token: Option<&str>,
    ) -> std::result::Result<ChatReply, ChatError> {
        let url = format!("{}/chat", self.base_url);
        let payload = ChatRequest {
            message,
            user_id,
            token,
        };

        tracing::debug!(
            "Sending chat message: user_id={}, authenticated={}",
            user_id,
            token.is_some()
        );

        let mut request = self.client.post(&url).json(&payload);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Chat request failed: {}", e);
            ChatError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        let body: ChatResponseBody = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse chat response: {}", e);
            ChatError::Protocol(format!("{}", e))
        })?;

        tracing::debug!(
            "Chat reply received: requires_auth={}, issued_token={}",
            body.requires_auth,
            body.token.is_some()
        );

        Ok(ChatReply {
            text: body.response,
            requires_auth: body.requires_auth,
            issued_token: body.token,
        })
    }

    /// Ask the server to reset the conversation for `user_id`
    ///
    /// Best effort on the caller's side, but failures are always surfaced;
    /// they are never swallowed.
    pub async fn clear_session(&self, user_id: &str) -> std::result::Result<(), ChatError> {
        let url = format!("{}/clear-session", self.base_url);

        tracing::debug!("Clearing server-side session for user_id={}", user_id);

        let response = self
            .client
            .post(&url)
            .json(&ClearSessionRequest { user_id })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Clear-session request failed: {}", e);
                ChatError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), response).await);
        }

        Ok(())
    }

    /// Probe the agent's health endpoint
    pub async fn check_health(&self) -> std::result::Result<HealthStatus, ChatError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), response).await);
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| ChatError::Protocol(format!("{}", e)))
    }
}

/// Map a non-success status and its body to a [`ChatError`]
///
/// 401/403 mean the user has to log in; other 4xx carry a server complaint
/// about the request itself; everything else is an upstream failure. The
/// `detail` field is preferred when the body parses, otherwise the raw body
/// text is used.
pub(crate) async fn classify_status(status: u16, response: reqwest::Response) -> ChatError {
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.detail)
        .unwrap_or(body);

    match status {
        401 | 403 => ChatError::AuthRequired,
        400..=499 => ChatError::Validation { detail },
        _ => ChatError::Upstream { status, detail },
    }
}
