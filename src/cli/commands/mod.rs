pub mod ask;
pub mod auth;
pub mod chat;
pub mod extract;
pub mod init;

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::cli::LlmProvider;
use crate::config::Config;
use crate::llm::LlmClient;
use crate::responder::QueryResponder;

/// Build a responder for `provider`, or the config's default provider
pub(crate) fn build_responder(
    config: &Config,
    provider: Option<LlmProvider>,
    model: Option<&str>,
) -> Result<QueryResponder> {
    let provider = match provider {
        Some(p) => p,
        None => LlmProvider::from_str(&config.default_provider, true).map_err(|_| {
            anyhow!(
                "Unknown default_provider '{}' in config (expected groq, openai, anthropic or ollama)",
                config.default_provider
            )
        })?,
    };

    let client = LlmClient::new(provider, config, model)?;
    Ok(QueryResponder::new(client).with_max_document_chars(config.max_document_chars))
}

/// Spinner shown while waiting on the model
pub(crate) fn thinking_spinner(prefix: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) =
        ProgressStyle::default_spinner().template(&format!("{}{{spinner:.green}} {{msg}}", prefix))
    {
        spinner.set_style(template);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Generating response...");
    spinner
}
