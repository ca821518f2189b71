//! Error types for BiteBot
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling. The chat client has its
//! own typed taxonomy (`ChatError`) so callers can branch on the outcome of
//! a request without string matching.

use thiserror::Error;

/// Main error type for BiteBot operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, client construction, and CLI command handling.
#[derive(Error, Debug)]
pub enum BitebotError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client construction or request-building errors
    #[error("Client error: {0}")]
    Client(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for BiteBot operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Outcome classification for a chat or auth request
///
/// Every request to the agent or auth backend resolves into exactly one of
/// these classes. The variants mirror what the UI has to do next: show the
/// server's complaint, open the login affordance, or report connectivity
/// loss.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The server rejected the request as malformed (4xx other than auth)
    ///
    /// `detail` carries the server-provided explanation verbatim and is
    /// intended to be shown to the user unchanged.
    #[error("invalid request: {detail}")]
    Validation {
        /// Server-provided detail message
        detail: String,
    },

    /// The request requires a logged-in user (401/403)
    #[error("authentication required")]
    AuthRequired,

    /// No response reached us at all (connect failure, timeout, DNS)
    #[error("network unavailable: {0}")]
    Network(String),

    /// The server answered with a 5xx status
    #[error("server error {status}: {detail}")]
    Upstream {
        /// HTTP status code returned by the server
        status: u16,
        /// Response body or reason phrase
        detail: String,
    },

    /// A success status carried a body we could not decode
    #[error("malformed server response: {0}")]
    Protocol(String),
}

impl ChatError {
    /// Returns `true` when the error means the user has to log in first
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    /// Returns `true` when no response was received from the server
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = BitebotError::Config("missing agent_url".to_string());
        assert_eq!(error.to_string(), "Configuration error: missing agent_url");
    }

    #[test]
    fn test_client_error_display() {
        let error = BitebotError::Client("failed to build HTTP client".to_string());
        assert_eq!(
            error.to_string(),
            "Client error: failed to build HTTP client"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: BitebotError = io_error.into();
        assert!(matches!(error, BitebotError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: BitebotError = json_error.into();
        assert!(matches!(error, BitebotError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: BitebotError = yaml_error.into();
        assert!(matches!(error, BitebotError::Yaml(_)));
    }

    #[test]
    fn test_validation_error_display() {
        let error = ChatError::Validation {
            detail: "message must not be empty".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "invalid request: message must not be empty"
        );
    }

    #[test]
    fn test_auth_required_display() {
        let error = ChatError::AuthRequired;
        assert_eq!(error.to_string(), "authentication required");
        assert!(error.is_auth_required());
    }

    #[test]
    fn test_network_error_display() {
        let error = ChatError::Network("connection refused".to_string());
        assert_eq!(error.to_string(), "network unavailable: connection refused");
        assert!(error.is_network());
    }

    #[test]
    fn test_upstream_error_display() {
        let error = ChatError::Upstream {
            status: 502,
            detail: "bad gateway".to_string(),
        };
        let s = error.to_string();
        assert!(s.contains("502"));
        assert!(s.contains("bad gateway"));
    }

    #[test]
    fn test_protocol_error_display() {
        let error = ChatError::Protocol("missing `response` field".to_string());
        assert!(error.to_string().contains("missing `response` field"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BitebotError>();
        assert_send_sync::<ChatError>();
    }
}
