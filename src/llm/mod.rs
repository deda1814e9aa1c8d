mod anthropic;
mod ollama;
mod openai;
pub mod prompts;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::cli::LlmProvider;
use crate::config::Config;

/// Groq serves an OpenAI-compatible chat completions API
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Trait for chat-completion backends
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one system message and one user message, return the reply text
    async fn complete(&self, system: &str, user_message: &str) -> Result<String>;

    /// Get the provider name
    fn name(&self) -> &'static str;
}

/// Sampling and transport settings shared by every provider
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl From<&Config> for GenerationSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

impl GenerationSettings {
    fn http_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")
    }
}

/// Main LLM client that abstracts over providers
pub struct LlmClient {
    provider: Box<dyn ChatModel>,
    model: String,
}

impl LlmClient {
    /// Create a new LLM client for the specified provider
    pub fn new(
        provider: LlmProvider,
        config: &Config,
        model_override: Option<&str>,
    ) -> Result<Self> {
        let settings = GenerationSettings::from(config);
        let provider_config = config
            .get_provider(&provider.to_string())
            .with_context(|| format!("{} provider not configured", provider))?;
        let model = model_override
            .map(String::from)
            .or_else(|| provider_config.model.clone())
            .unwrap_or_else(|| provider.default_model().to_string());
        let base_url = provider_config.base_url.as_deref();

        let provider_impl: Box<dyn ChatModel> = match provider {
            LlmProvider::Groq => Box::new(openai::OpenAIProvider::new(
                "groq",
                &provider_config.api_key,
                &model,
                Some(base_url.unwrap_or(GROQ_BASE_URL)),
                &settings,
            )?),
            LlmProvider::OpenAI => Box::new(openai::OpenAIProvider::new(
                "openai",
                &provider_config.api_key,
                &model,
                base_url,
                &settings,
            )?),
            LlmProvider::Anthropic => Box::new(anthropic::AnthropicProvider::new(
                &provider_config.api_key,
                &model,
                base_url,
                &settings,
            )?),
            LlmProvider::Ollama => Box::new(ollama::OllamaProvider::new(
                base_url.unwrap_or("http://localhost:11434"),
                &model,
                &settings,
            )?),
        };

        tracing::debug!(provider = provider_impl.name(), %model, "Created LLM client");

        Ok(Self {
            provider: provider_impl,
            model,
        })
    }

    /// Wrap an already constructed backend
    #[cfg(test)]
    pub fn from_model(provider: Box<dyn ChatModel>, model: &str) -> Self {
        Self {
            provider,
            model: model.to_string(),
        }
    }

    pub async fn complete(&self, system: &str, user_message: &str) -> Result<String> {
        self.provider.complete(system, user_message).await
    }

    /// Get the provider name
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
