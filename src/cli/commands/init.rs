use anyhow::Result;
use console::{Emoji, style};
use std::path::Path;

use crate::config::Config;

static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");

pub async fn run(config_path: &Path, force: bool) -> Result<()> {
    println!();
    println!("{}", style(" docchat - Initialization ").bold().reverse());
    println!();

    if config_path.exists() && !force {
        println!(
            "{}Configuration already exists at {}",
            WARN,
            style(config_path.display()).cyan()
        );
        println!("  Use {} to overwrite", style("--force").yellow());
        return Ok(());
    }

    Config::default().save(config_path)?;

    println!(
        "{}Created configuration at {}",
        CHECK,
        style(config_path.display()).cyan()
    );

    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();
    println!("{}Next steps:", ROCKET);
    println!();
    println!("  {}Configure your LLM provider:", KEY);
    println!("    {} docchat auth", style("$").dim());
    println!();
    println!("  {}Ask your first question:", ROCKET);
    println!(
        "    {} docchat ask report.pdf \"What is this document about?\"",
        style("$").dim()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_init_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docchat").join("config.toml");

        run(&path, false).await.unwrap();

        let config = Config::load_raw(&path).unwrap();
        assert_eq!(config.default_provider, "groq");
        assert_eq!(config.get_provider("groq").unwrap().api_key, "${GROQ_API_KEY}");
    }

    #[tokio::test]
    async fn test_init_keeps_existing_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_provider = \"ollama\"\n").unwrap();

        run(&path, false).await.unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "default_provider = \"ollama\"\n");

        run(&path, true).await.unwrap();
        assert_eq!(Config::load_raw(&path).unwrap().default_provider, "groq");
    }
}
