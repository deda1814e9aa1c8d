use anyhow::{Context, Result};
use console::{Emoji, style};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crate::cli::LlmProvider;
use crate::config::{Config, ProviderConfig};

static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[X] ");
static ROBOT: Emoji<'_, '_> = Emoji("🤖 ", "");

pub async fn run(
    config_path: &Path,
    provider: Option<LlmProvider>,
    key: Option<String>,
    list: bool,
) -> Result<()> {
    println!();
    println!("{}", style(" docchat - Authentication ").bold().reverse());
    println!();

    if list {
        return list_providers(config_path).await;
    }

    let provider = match provider {
        Some(p) => p,
        None => select_provider()?,
    };

    let api_key = match key {
        Some(k) => k,
        None => prompt_api_key(provider)?,
    };

    save_api_key(config_path, provider, &api_key)?;

    println!();
    println!(
        "{}API key for {} saved to {}",
        CHECK,
        style(provider.to_string()).cyan().bold(),
        style(config_path.display()).dim()
    );

    Ok(())
}

async fn list_providers(config_path: &Path) -> Result<()> {
    println!("{}Configured LLM Providers", ROBOT);
    println!();

    let config = Config::load_raw(config_path)?;

    let providers = [
        ("Groq", check_provider_status(&config, LlmProvider::Groq)),
        ("OpenAI", check_provider_status(&config, LlmProvider::OpenAI)),
        ("Anthropic", check_provider_status(&config, LlmProvider::Anthropic)),
        ("Ollama", check_ollama_status(&config).await),
    ];

    for (name, (configured, detail)) in providers {
        let status_icon = if configured { CHECK } else { CROSS };
        let status_text = if configured {
            style("Configured").green()
        } else {
            style("Not configured").red()
        };

        println!(
            "  {}{:<12} {} {}",
            status_icon,
            name,
            status_text,
            style(detail).dim()
        );
    }

    println!();
    println!("{}Set API keys with:", KEY);
    println!("  {} docchat auth --provider <name>", style("$").dim());
    println!();
    println!("Or set environment variables:");
    println!("  {} export GROQ_API_KEY=your-key", style("$").dim());
    println!("  {} export OPENAI_API_KEY=your-key", style("$").dim());
    println!("  {} export ANTHROPIC_API_KEY=your-key", style("$").dim());

    Ok(())
}

fn check_provider_status(config: &Config, provider: LlmProvider) -> (bool, String) {
    // Environment first, matching how `${VAR}` keys resolve at load time
    if let Some(env_var) = provider.env_var()
        && let Ok(val) = std::env::var(env_var)
        && !val.is_empty()
    {
        return (true, format!("(from {})", env_var));
    }

    if let Some(provider_config) = config.get_provider(&provider.to_string())
        && !provider_config.api_key.is_empty()
        && !provider_config.api_key.starts_with('$')
    {
        return (true, "(from config)".to_string());
    }

    (false, String::new())
}

async fn check_ollama_status(config: &Config) -> (bool, String) {
    let base_url = config
        .get_provider("ollama")
        .and_then(|p| p.base_url.as_deref())
        .unwrap_or("http://localhost:11434")
        .trim_end_matches('/');

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build();

    if let Ok(client) = client
        && let Ok(resp) = client.get(format!("{}/api/tags", base_url)).send().await
        && resp.status().is_success()
    {
        return (true, format!("(running at {})", base_url));
    }

    (false, format!("(not running at {})", base_url))
}

fn select_provider() -> Result<LlmProvider> {
    println!("Select LLM Provider:");
    println!();
    println!("  {} Groq (default)", style("1.").cyan());
    println!("  {} OpenAI", style("2.").cyan());
    println!("  {} Anthropic (Claude)", style("3.").cyan());
    println!("  {} Ollama (Local - Free)", style("4.").cyan());
    println!();

    print!("{} Enter choice [1-4]: ", style("?").green().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    match input.trim() {
        "1" | "" => Ok(LlmProvider::Groq),
        "2" => Ok(LlmProvider::OpenAI),
        "3" => Ok(LlmProvider::Anthropic),
        "4" => Ok(LlmProvider::Ollama),
        other => anyhow::bail!("Invalid choice '{}'", other),
    }
}

fn prompt_api_key(provider: LlmProvider) -> Result<String> {
    if provider == LlmProvider::Ollama {
        println!();
        println!("  {} Ollama doesn't require an API key.", style("ℹ").blue());
        println!(
            "  Make sure Ollama is running: {} ollama serve",
            style("$").dim()
        );
        return Ok(String::new());
    }

    print!(
        "{} Enter your {} API key: ",
        style("?").green().bold(),
        provider
    );
    io::stdout().flush()?;

    let mut api_key = String::new();
    io::stdin().read_line(&mut api_key)?;
    let api_key = api_key.trim().to_string();

    if api_key.is_empty() {
        anyhow::bail!("API key cannot be empty");
    }

    if let Some(prefix) = key_prefix(provider)
        && !api_key.starts_with(prefix)
    {
        println!(
            "  {}",
            style(format!(
                "Warning: {} API keys typically start with '{}'",
                provider, prefix
            ))
            .yellow()
        );
    }

    Ok(api_key)
}

fn key_prefix(provider: LlmProvider) -> Option<&'static str> {
    match provider {
        LlmProvider::Groq => Some("gsk_"),
        LlmProvider::OpenAI => Some("sk-"),
        LlmProvider::Anthropic => Some("sk-ant-"),
        LlmProvider::Ollama => None,
    }
}

/// Store `api_key` for `provider`, leaving the rest of the file's settings as they were
fn save_api_key(config_path: &Path, provider: LlmProvider, api_key: &str) -> Result<()> {
    let mut config = Config::load_raw(config_path)?;

    let slot = config
        .provider_slot(&provider.to_string())
        .with_context(|| format!("No config section for provider {}", provider))?;

    let entry = slot.get_or_insert_with(|| ProviderConfig {
        api_key: String::new(),
        base_url: None,
        model: Some(provider.default_model().to_string()),
    });
    entry.api_key = api_key.to_string();

    config.save(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_save_api_key_updates_only_that_provider() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            default_provider = "openai"
            max_tokens = 512

            [providers.openai]
            api_key = "${OPENAI_API_KEY}"
            base_url = "http://proxy.local/v1"
            "#,
        )
        .unwrap();

        save_api_key(&path, LlmProvider::OpenAI, "sk-new").unwrap();
        save_api_key(&path, LlmProvider::Anthropic, "sk-ant-new").unwrap();

        let config = Config::load_raw(&path).unwrap();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.max_tokens, 512);

        let openai = config.get_provider("openai").unwrap();
        assert_eq!(openai.api_key, "sk-new");
        assert_eq!(openai.base_url.as_deref(), Some("http://proxy.local/v1"));

        let anthropic = config.get_provider("anthropic").unwrap();
        assert_eq!(anthropic.api_key, "sk-ant-new");
        assert_eq!(anthropic.model.as_deref(), Some("claude-sonnet-4-20250514"));
    }

    #[test]
    fn test_save_api_key_creates_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh").join("config.toml");

        save_api_key(&path, LlmProvider::Groq, "gsk_abc").unwrap();

        let config = Config::load_raw(&path).unwrap();
        assert_eq!(config.get_provider("groq").unwrap().api_key, "gsk_abc");
        assert_eq!(
            config.get_provider("openai").unwrap().api_key,
            "${OPENAI_API_KEY}"
        );
    }

    #[test]
    fn test_status_from_config_key() {
        let config: Config = toml::from_str(
            r#"
            [providers.anthropic]
            api_key = "sk-ant-literal"

            [providers.openai]
            api_key = "${SOME_UNSET_VAR}"
            "#,
        )
        .unwrap();

        assert!(check_provider_status(&config, LlmProvider::Anthropic).0);

        // Unexpanded references only count when the variable is set
        if std::env::var("OPENAI_API_KEY").is_err() {
            assert!(!check_provider_status(&config, LlmProvider::OpenAI).0);
        }
    }
}
