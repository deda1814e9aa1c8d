pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(author = "docchat contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract text from documents and ask an LLM questions about them", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (defaults to ~/.config/docchat/config.toml)
    #[arg(long, global = true, env = "DOCCHAT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Configure API keys for LLM providers
    #[command(long_about = "Configure API keys for LLM providers.\n\n\
        Supported providers: groq, openai, anthropic, ollama.\n\
        Groq is used through its OpenAI-compatible endpoint; any other\n\
        OpenAI-compatible service works with 'openai' and a custom base_url.\n\n\
        Set base_url in ~/.config/docchat/config.toml for each provider.")]
    Auth {
        /// Provider to configure (groq, openai, anthropic, ollama)
        #[arg(short, long)]
        provider: Option<LlmProvider>,

        /// Set API key directly (alternative to interactive prompt)
        #[arg(short, long)]
        key: Option<String>,

        /// List configured providers and their status
        #[arg(long, default_value = "false")]
        list: bool,
    },

    /// Extract and print the text of a document
    Extract {
        /// Document to read (xlsx, pdf, docx, txt, html, epub, md)
        #[arg(required = true)]
        file: PathBuf,

        /// Write the text to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask one question about a document
    Ask {
        /// Document to read (xlsx, pdf, docx, txt, html, epub, md)
        #[arg(required = true)]
        file: PathBuf,

        /// Question about the document
        #[arg(required = true)]
        question: String,

        /// LLM provider (groq, openai, anthropic, ollama)
        #[arg(short, long, env = "DOCCHAT_PROVIDER")]
        provider: Option<LlmProvider>,

        /// Model name (provider-specific, e.g. gemma2-9b-it, gpt-4o, mistral)
        #[arg(short, long, env = "DOCCHAT_MODEL")]
        model: Option<String>,
    },

    /// Chat about a document interactively
    Chat {
        /// Document to load at start (use /load inside the session otherwise)
        file: Option<PathBuf>,

        /// LLM provider (groq, openai, anthropic, ollama)
        #[arg(short, long, env = "DOCCHAT_PROVIDER")]
        provider: Option<LlmProvider>,

        /// Model name (provider-specific, e.g. gemma2-9b-it, gpt-4o, mistral)
        #[arg(short, long, env = "DOCCHAT_MODEL")]
        model: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum LlmProvider {
    #[default]
    Groq,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl LlmProvider {
    /// Model used when neither the command line nor the config names one
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "gemma2-9b-it",
            LlmProvider::OpenAI => "gpt-4o",
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
            LlmProvider::Ollama => "mistral",
        }
    }

    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Groq => Some("GROQ_API_KEY"),
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LlmProvider::Ollama => None,
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Groq => write!(f, "groq"),
            LlmProvider::OpenAI => write!(f, "openai"),
            LlmProvider::Anthropic => write!(f, "anthropic"),
            LlmProvider::Ollama => write!(f, "ollama"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names_round_trip() {
        for provider in LlmProvider::value_variants() {
            let parsed = LlmProvider::from_str(&provider.to_string(), true).unwrap();
            assert_eq!(parsed, *provider);
        }
    }

    #[test]
    fn test_cli_parses_ask() {
        let cli = Cli::try_parse_from([
            "docchat", "ask", "report.pdf", "What is the total?", "--provider", "openai",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask {
                file,
                question,
                provider,
                ..
            } => {
                assert_eq!(file, PathBuf::from("report.pdf"));
                assert_eq!(question, "What is the total?");
                assert_eq!(provider, Some(LlmProvider::OpenAI));
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli = Cli::try_parse_from(["docchat", "extract", "a.txt", "--config", "/tmp/c.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}
