use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Cap on document characters placed in a prompt; unset sends everything
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_document_chars: Option<usize>,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_request_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub groq: Option<ProviderConfig>,
    pub openai: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
    pub ollama: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl Default for Config {
    /// The configuration `docchat init` writes: every provider reads its key
    /// from the conventional environment variable.
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            max_document_chars: None,
            providers: ProvidersConfig {
                groq: Some(ProviderConfig {
                    api_key: "${GROQ_API_KEY}".to_string(),
                    base_url: None,
                    model: Some("gemma2-9b-it".to_string()),
                }),
                openai: Some(ProviderConfig {
                    api_key: "${OPENAI_API_KEY}".to_string(),
                    base_url: None,
                    model: Some("gpt-4o".to_string()),
                }),
                anthropic: Some(ProviderConfig {
                    api_key: "${ANTHROPIC_API_KEY}".to_string(),
                    base_url: None,
                    model: Some("claude-sonnet-4-20250514".to_string()),
                }),
                ollama: Some(ProviderConfig {
                    api_key: String::new(),
                    base_url: Some("http://localhost:11434".to_string()),
                    model: Some("mistral".to_string()),
                }),
            },
        }
    }
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("docchat");
        Ok(config_dir)
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from `path`, falling back to built-in defaults when
    /// the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::load_raw(path)?;

        // Expand environment variables in API keys
        config.expand_env_vars();

        Ok(config)
    }

    /// Like `load_from` but keeps `${VAR}` references as written, for editing
    pub fn load_raw(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    /// Write configuration to `path`, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file at {}", path.display()))
    }

    /// Expand environment variables in configuration values
    fn expand_env_vars(&mut self) {
        for provider in [
            &mut self.providers.groq,
            &mut self.providers.openai,
            &mut self.providers.anthropic,
            &mut self.providers.ollama,
        ]
        .into_iter()
        .flatten()
        {
            provider.api_key = expand_env_var(&provider.api_key);
        }
    }

    /// Provider slot by name, for editing
    pub fn provider_slot(&mut self, name: &str) -> Option<&mut Option<ProviderConfig>> {
        match name.to_lowercase().as_str() {
            "groq" => Some(&mut self.providers.groq),
            "openai" => Some(&mut self.providers.openai),
            "anthropic" => Some(&mut self.providers.anthropic),
            "ollama" => Some(&mut self.providers.ollama),
            _ => None,
        }
    }

    /// Get provider configuration by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        match name.to_lowercase().as_str() {
            "groq" => self.providers.groq.as_ref(),
            "openai" => self.providers.openai.as_ref(),
            "anthropic" => self.providers.anthropic.as_ref(),
            "ollama" => self.providers.ollama.as_ref(),
            _ => None,
        }
    }
}

/// Expand environment variable references like ${VAR_NAME}
fn expand_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_default()
    } else {
        value.to_string()
    }
}
