//! Command-line interface definition for BiteBot
//!
//! This module defines the CLI structure using clap's derive API, providing
//! the interactive chat command plus one-shot helpers for sending, session
//! management, and authentication.

use clap::{Parser, Subcommand};

/// BiteBot - terminal chat client for the food-ordering assistant
///
/// Talk to the ordering assistant from the terminal, with the same session,
/// authentication, and message formatting behavior as the web widget.
#[derive(Parser, Debug, Clone)]
#[command(name = "bitebot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the agent server URL from config
    #[arg(long, env = "BITEBOT_AGENT_URL")]
    pub server: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for BiteBot
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// User id for the conversation (defaults to config)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Send a single message and print the reply
    Send {
        /// The message to send
        message: String,

        /// User id for the conversation (defaults to config)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Clear the server-side conversation for a user
    Clear {
        /// User id whose session to clear (defaults to config)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Log in and store the issued token
    Login {
        /// Username to log in as
        username: String,

        /// Password (prompted interactively when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Remove the stored token
    Logout,

    /// Register a new account
    Register {
        /// Username for the new account
        username: String,

        /// Email address for the new account
        email: String,

        /// Password (prompted interactively when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Probe the agent's health endpoint
    Health,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
