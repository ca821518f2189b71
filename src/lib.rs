//! BiteBot - terminal chat client library
//!
//! This library provides the core functionality behind the BiteBot chat
//! client: the message formatting pipeline, the append-only session log,
//! and the typed HTTP clients for the ordering assistant and its auth
//! service.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `formatter`: raw message text -> ordered display segments
//! - `session`: append-only per-conversation message log
//! - `client`: chat/clear-session/health calls with typed outcomes
//! - `auth`: login/register client and token store abstraction
//! - `render`: terminal realization of formatted segments
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use bitebot::client::ChatClient;
//! use bitebot::formatter::MessageFormatter;
//! use bitebot::session::{ChatSession, Sender};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ChatClient::new("http://localhost:5000", Duration::from_secs(30))?;
//!     let formatter = MessageFormatter::new()?;
//!     let mut session = ChatSession::new("guest");
//!
//!     session.append(Sender::User, "Show restaurants");
//!     if let Ok(reply) = client.send_message("Show restaurants", "guest", None).await {
//!         let message = session.append(Sender::Bot, &reply.text);
//!         let _segments = formatter.format(&message.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod formatter;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use auth::{AuthClient, FileTokenStore, MemoryTokenStore, StoredToken, TokenStore};
pub use client::{ChatClient, ChatReply, HealthStatus};
pub use config::Config;
pub use error::{BitebotError, ChatError, Result};
pub use formatter::{MessageFormatter, Segment, SeparatorWeight, Span};
pub use session::{ChatMessage, ChatSession, Sender};
