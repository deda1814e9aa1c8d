use anyhow::Result;
use console::{Emoji, style};
use std::path::{Path, PathBuf};

use super::{build_responder, thinking_spinner};
use crate::cli::LlmProvider;
use crate::config::Config;
use crate::extract::UploadedDocument;
use crate::session::Session;

static DOC: Emoji<'_, '_> = Emoji("📄 ", "");
static ROBOT: Emoji<'_, '_> = Emoji("🤖 ", "");
static BRAIN: Emoji<'_, '_> = Emoji("🧠 ", "");

pub async fn run(
    config_path: &Path,
    file: PathBuf,
    question: String,
    provider: Option<LlmProvider>,
    model: Option<String>,
) -> Result<()> {
    let config = Config::load_from(config_path)?;
    let responder = build_responder(&config, provider, model.as_deref())?;

    let mut session = Session::new();
    let document = session.upload(&UploadedDocument::from_path(&file)?)?;
    println!(
        "{}Loaded {} ({} characters)",
        DOC,
        style(&document.name).cyan(),
        document.text.chars().count()
    );
    println!(
        "  Using {} / {}",
        style(responder.client().provider_name()).cyan(),
        style(responder.client().model()).cyan()
    );

    let spinner = thinking_spinner(&BRAIN.to_string());
    let turn = session.ask(&responder, &question).await;
    spinner.finish_and_clear();
    let turn = turn?;

    println!();
    println!("{}{}", ROBOT, style("AI Response:").bold());
    println!();
    println!("{}", turn.answer);

    Ok(())
}
