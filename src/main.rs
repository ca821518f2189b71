//! BiteBot - terminal chat client
//!
#![doc = "BiteBot - terminal chat client for the food-ordering assistant"]
#![doc = "Main entry point for the BiteBot application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bitebot::cli::{Cli, Commands};
use bitebot::commands;
use bitebot::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { user } => {
            tracing::info!("Starting interactive chat");
            commands::chat::run_chat(config, user).await?;
            Ok(())
        }
        Commands::Send { message, user } => {
            commands::send::send_once(config, message, user).await?;
            Ok(())
        }
        Commands::Clear { user } => {
            commands::session::clear_session(config, user).await?;
            Ok(())
        }
        Commands::Login { username, password } => {
            commands::auth::login(config, username, password).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::auth::logout()?;
            Ok(())
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            commands::auth::register(config, username, email, password).await?;
            Ok(())
        }
        Commands::Health => {
            commands::health::check(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "bitebot=debug" } else { "bitebot=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
