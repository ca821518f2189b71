/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes the top-level command modules:

- `chat`    — Interactive chat session
- `send`    — One-shot message send
- `session` — Server-side session reset
- `auth`    — Login, logout, and registration
- `health`  — Agent health probe

These handlers are intentionally small and use the library components:
the chat client, the session log, and the formatting pipeline.
*/

use colored::Colorize;

use crate::auth::{AuthClient, FileTokenStore, StoredToken, TokenStore};
use crate::client::ChatClient;
use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::formatter::MessageFormatter;
use crate::render;
use crate::session::{ChatSession, Sender};

/// Slash commands understood by the interactive chat loop
#[derive(Debug, Clone, PartialEq, Eq)]
enum SlashCommand {
    /// Show help
    Help,
    /// Clear the conversation, remotely and locally
    Clear,
    /// Log in and store the issued token
    Login,
    /// Drop the stored token
    Logout,
    /// Show session status
    Status,
    /// Print the local message history
    History,
    /// Leave the chat
    Exit,
    /// Not a command; treat as a chat message
    None,
}

/// Parse a line of input into a slash command
fn parse_slash_command(input: &str) -> SlashCommand {
    match input.trim().to_lowercase().as_str() {
        "/help" => SlashCommand::Help,
        "/clear" => SlashCommand::Clear,
        "/login" => SlashCommand::Login,
        "/logout" => SlashCommand::Logout,
        "/status" => SlashCommand::Status,
        "/history" => SlashCommand::History,
        "/quit" | "/exit" | "exit" | "quit" => SlashCommand::Exit,
        _ => SlashCommand::None,
    }
}

/// Print the interactive help text
fn print_help() {
    println!("\nAvailable commands:");
    println!("  /help     Show this help");
    println!("  /clear    Clear the conversation (server and local)");
    println!("  /login    Log in to your account");
    println!("  /logout   Forget the stored login");
    println!("  /status   Show session status");
    println!("  /history  Show the local message history");
    println!("  exit      Leave the chat\n");
}

/// Print a user-facing line for a failed request
///
/// Validation details are shown verbatim; connectivity loss gets a generic
/// message; auth failures point at the login affordance.
fn report_chat_error(error: &ChatError) {
    match error {
        ChatError::AuthRequired => {
            println!(
                "{}",
                "You need to log in first. Use /login (or `bitebot login <username>`).".yellow()
            );
        }
        ChatError::Network(_) => {
            println!(
                "{}",
                "Could not reach the assistant. Check your connection and try again.".red()
            );
        }
        ChatError::Validation { detail } => {
            println!("{}", detail.red());
        }
        other => {
            eprintln!("{}", format!("Error: {}", other).red());
        }
    }
}

/// Load the stored token, degrading to anonymous on storage errors
fn load_token(store: &dyn TokenStore) -> Option<StoredToken> {
    match store.load() {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("Failed to load stored token: {}", e);
            None
        }
    }
}

/// Persist a freshly issued token, logging instead of failing the turn
fn persist_issued_token(store: &dyn TokenStore, token: &str, username: &str) {
    if let Err(e) = store.save(&StoredToken::new(token, username)) {
        tracing::warn!("Failed to persist issued token: {}", e);
    } else {
        tracing::info!("Stored token issued during conversation");
    }
}

/// Interactive chat command handler
pub mod chat {
    //! Interactive chat session handler.
    //!
    //! Runs a readline loop that appends user input to the local session,
    //! sends it to the agent with the stored token, appends the reply, and
    //! renders both through the formatting pipeline.

    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `user` - Optional override for the configured user id
    pub async fn run_chat(config: Config, user: Option<String>) -> Result<()> {
        let user_id = user.unwrap_or_else(|| config.chat.user_id.clone());

        let client = ChatClient::new(&config.api.agent_url, config.timeout())?;
        let auth_client = AuthClient::new(&config.api.auth_url, config.timeout())?;
        let store = FileTokenStore::new()?;
        let formatter = MessageFormatter::new()?;

        let mut session = ChatSession::new(user_id.clone());
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&user_id, client.base_url());

        // At most one send may be outstanding per session; the flag mirrors
        // the web widget disabling its input while a request is in flight.
        let mut in_flight = false;

        loop {
            let prompt = format!("{} ", format!("[{}] >>", user_id).green());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_slash_command(trimmed) {
                        SlashCommand::Help => {
                            print_help();
                            continue;
                        }
                        SlashCommand::Clear => {
                            handle_clear(&client, &user_id, &mut session).await;
                            continue;
                        }
                        SlashCommand::Login => {
                            handle_login(&auth_client, &store, &mut rl, &user_id).await;
                            continue;
                        }
                        SlashCommand::Logout => {
                            match store.clear() {
                                Ok(()) => println!("Logged out.\n"),
                                Err(e) => eprintln!("Failed to clear stored login: {}\n", e),
                            }
                            continue;
                        }
                        SlashCommand::Status => {
                            print_status(&session, &store);
                            continue;
                        }
                        SlashCommand::History => {
                            print_history(&session, &formatter, config.chat.show_timestamps);
                            continue;
                        }
                        SlashCommand::Exit => break,
                        SlashCommand::None => {}
                    }

                    rl.add_history_entry(trimmed)?;

                    if in_flight {
                        println!("Still waiting for the previous reply...");
                        continue;
                    }
                    in_flight = true;

                    // Capture the generation before dispatch so a reply that
                    // lands after /clear can be recognized as stale.
                    let generation = session.generation();
                    session.append(Sender::User, trimmed);

                    let token = load_token(&store).map(|t| t.token);
                    let outcome = client
                        .send_message(trimmed, &user_id, token.as_deref())
                        .await;
                    in_flight = false;

                    if session.generation() != generation {
                        tracing::debug!("Dropping reply for a cleared session");
                        continue;
                    }

                    match outcome {
                        Ok(reply) => {
                            if let Some(issued) = &reply.issued_token {
                                persist_issued_token(&store, issued, &user_id);
                            }

                            let message = session.append(Sender::Bot, &reply.text);
                            println!(
                                "\n{}\n",
                                render::to_terminal(&formatter.format(&message.text))
                            );

                            if reply.requires_auth {
                                println!("{}", "Use /login to sign in.\n".yellow());
                            }
                        }
                        Err(error) => {
                            report_chat_error(&error);
                            println!();
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Clear the conversation remotely, then locally
    ///
    /// The remote reset is best effort but its failure is always reported;
    /// the local log is cleared regardless so the UI matches the user's
    /// intent.
    async fn handle_clear(client: &ChatClient, user_id: &str, session: &mut ChatSession) {
        match client.clear_session(user_id).await {
            Ok(()) => println!("Conversation cleared.\n"),
            Err(error) => {
                println!("Server-side clear failed:");
                report_chat_error(&error);
                println!();
            }
        }
        session.clear();
    }

    /// Prompt for credentials and store the issued token
    async fn handle_login(
        auth_client: &AuthClient,
        store: &FileTokenStore,
        rl: &mut DefaultEditor,
        default_username: &str,
    ) {
        let username = match rl.readline(&format!("Username [{}]: ", default_username)) {
            Ok(line) => {
                let trimmed = line.trim().to_string();
                if trimmed.is_empty() {
                    default_username.to_string()
                } else {
                    trimmed
                }
            }
            Err(_) => return,
        };
        let password = match rl.readline("Password: ") {
            Ok(line) => line,
            Err(_) => return,
        };

        match auth_client.login(&username, &password).await {
            Ok(token) => match store.save(&token) {
                Ok(()) => println!("{}\n", format!("Welcome back, {}!", username).green()),
                Err(e) => eprintln!("Logged in, but storing the token failed: {}\n", e),
            },
            Err(error) => {
                report_chat_error(&error);
                println!();
            }
        }
    }

    /// Display welcome banner at the start of an interactive session
    fn print_welcome_banner(user_id: &str, agent_url: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              BiteBot — your food ordering assistant          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("User:   {}", user_id);
        println!("Server: {}\n", agent_url);
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display session status for the '/status' command
    fn print_status(session: &ChatSession, store: &FileTokenStore) {
        let login = match load_token(store) {
            Some(token) => format!("logged in as {}", token.username),
            None => "not logged in".to_string(),
        };
        println!("\nSession:  {}", session.session_id());
        println!("Messages: {}", session.len());
        println!("Login:    {}", login);
        println!("Started:  {}\n", session.created_at().to_rfc3339());
    }

    /// Print the local history for the '/history' command
    fn print_history(session: &ChatSession, formatter: &MessageFormatter, timestamps: bool) {
        if session.is_empty() {
            println!("No messages yet.\n");
            return;
        }
        println!();
        for message in session.history() {
            let tag = match message.sender {
                Sender::User => "you".green(),
                Sender::Bot => "bot".cyan(),
            };
            if timestamps {
                println!(
                    "[{}] {}: {}",
                    message.timestamp.format("%H:%M:%S"),
                    tag,
                    render::to_terminal(&formatter.format(&message.text))
                );
            } else {
                println!(
                    "{}: {}",
                    tag,
                    render::to_terminal(&formatter.format(&message.text))
                );
            }
        }
        println!();
    }
}

/// One-shot send command handler
pub mod send {
    use super::*;

    /// Send a single message and print the rendered reply
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `message` - The message to send
    /// * `user` - Optional override for the configured user id
    pub async fn send_once(config: Config, message: String, user: Option<String>) -> Result<()> {
        let user_id = user.unwrap_or_else(|| config.chat.user_id.clone());
        let client = ChatClient::new(&config.api.agent_url, config.timeout())?;
        let store = FileTokenStore::new()?;
        let formatter = MessageFormatter::new()?;

        let token = load_token(&store).map(|t| t.token);
        match client
            .send_message(&message, &user_id, token.as_deref())
            .await
        {
            Ok(reply) => {
                if let Some(issued) = &reply.issued_token {
                    persist_issued_token(&store, issued, &user_id);
                }
                println!("{}", render::to_terminal(&formatter.format(&reply.text)));
                if reply.requires_auth {
                    println!("{}", "Log in with `bitebot login <username>`.".yellow());
                }
                Ok(())
            }
            Err(error) => {
                report_chat_error(&error);
                Err(error.into())
            }
        }
    }
}

/// Session management command handler
pub mod session {
    use super::*;

    /// Clear the server-side conversation for a user
    pub async fn clear_session(config: Config, user: Option<String>) -> Result<()> {
        let user_id = user.unwrap_or_else(|| config.chat.user_id.clone());
        let client = ChatClient::new(&config.api.agent_url, config.timeout())?;

        match client.clear_session(&user_id).await {
            Ok(()) => {
                println!("Conversation cleared for {}.", user_id);
                Ok(())
            }
            Err(error) => {
                report_chat_error(&error);
                Err(error.into())
            }
        }
    }
}

/// Authentication command handlers
pub mod auth {
    use super::*;
    use rustyline::DefaultEditor;

    /// Log in and persist the issued token
    ///
    /// Prompts for the password when it was not passed on the command line.
    pub async fn login(config: Config, username: String, password: Option<String>) -> Result<()> {
        let auth_client = AuthClient::new(&config.api.auth_url, config.timeout())?;
        let store = FileTokenStore::new()?;

        let password = match password {
            Some(p) => p,
            None => {
                let mut rl = DefaultEditor::new()?;
                rl.readline("Password: ")?
            }
        };

        match auth_client.login(&username, &password).await {
            Ok(token) => {
                store.save(&token)?;
                println!("Logged in as {}.", username);
                Ok(())
            }
            Err(error) => {
                report_chat_error(&error);
                Err(error.into())
            }
        }
    }

    /// Remove the stored token
    pub fn logout() -> Result<()> {
        let store = FileTokenStore::new()?;
        store.clear()?;
        println!("Logged out.");
        Ok(())
    }

    /// Register a new account
    pub async fn register(
        config: Config,
        username: String,
        email: String,
        password: Option<String>,
    ) -> Result<()> {
        let auth_client = AuthClient::new(&config.api.auth_url, config.timeout())?;

        let password = match password {
            Some(p) => p,
            None => {
                let mut rl = DefaultEditor::new()?;
                rl.readline("Password: ")?
            }
        };

        match auth_client.register(&username, &email, &password).await {
            Ok(()) => {
                println!(
                    "Registration successful. Log in with `bitebot login {}`.",
                    username
                );
                Ok(())
            }
            Err(error) => {
                report_chat_error(&error);
                Err(error.into())
            }
        }
    }
}

/// Health probe command handler
pub mod health {
    use super::*;

    /// Probe the agent and print the reported status
    pub async fn check(config: Config) -> Result<()> {
        let client = ChatClient::new(&config.api.agent_url, config.timeout())?;

        match client.check_health().await {
            Ok(status) => {
                println!("Agent at {} reports: {}", client.base_url(), status.status);
                Ok(())
            }
            Err(error) => {
                report_chat_error(&error);
                Err(error.into())
            }
        }
    }
}
