mod cli;
mod config;
mod error;
mod extract;
mod llm;
mod responder;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing - only show warnings by default, use RUST_LOG=info for more detail
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };

    match cli.command {
        Commands::Init { force } => {
            cli::commands::init::run(&config_path, force).await?;
        }
        Commands::Auth {
            provider,
            key,
            list,
        } => {
            cli::commands::auth::run(&config_path, provider, key, list).await?;
        }
        Commands::Extract { file, output } => {
            cli::commands::extract::run(file, output).await?;
        }
        Commands::Ask {
            file,
            question,
            provider,
            model,
        } => {
            cli::commands::ask::run(&config_path, file, question, provider, model).await?;
        }
        Commands::Chat {
            file,
            provider,
            model,
        } => {
            cli::commands::chat::run(&config_path, file, provider, model).await?;
        }
    }

    Ok(())
}
