use anyhow::Result;
use console::{Emoji, style};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use super::{build_responder, thinking_spinner};
use crate::cli::LlmProvider;
use crate::config::Config;
use crate::error::RequestError;
use crate::extract::{ACCEPTED_EXTENSIONS, UploadedDocument};
use crate::responder::QueryResponder;
use crate::session::{Session, SessionState};

static DOC: Emoji<'_, '_> = Emoji("📄 ", "");
static ROBOT: Emoji<'_, '_> = Emoji("🤖 ", "");
static BRAIN: Emoji<'_, '_> = Emoji("🧠 ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[X] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

/// One line typed at the chat prompt
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Blank,
    Quit,
    Help,
    Clear,
    Show,
    Load(&'a str),
    Unknown(&'a str),
    Question(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Blank;
    }

    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Question(line);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" | "q" => ChatInput::Quit,
        "help" | "?" => ChatInput::Help,
        "clear" => ChatInput::Clear,
        "show" => ChatInput::Show,
        "load" => ChatInput::Load(arg),
        _ => ChatInput::Unknown(line),
    }
}

/// Model client built on the first question, so a missing key does not
/// block loading and reading documents
struct LazyResponder {
    config: Config,
    provider: Option<LlmProvider>,
    model: Option<String>,
    responder: Option<QueryResponder>,
}

impl LazyResponder {
    fn get(&mut self) -> Result<&QueryResponder> {
        let responder = match self.responder.take() {
            Some(responder) => responder,
            None => {
                let responder =
                    build_responder(&self.config, self.provider, self.model.as_deref())?;
                println!(
                    "{}Using {} / {}",
                    ROBOT,
                    style(responder.client().provider_name()).cyan(),
                    style(responder.client().model()).cyan()
                );
                responder
            }
        };

        Ok(self.responder.insert(responder))
    }
}

pub async fn run(
    config_path: &Path,
    file: Option<PathBuf>,
    provider: Option<LlmProvider>,
    model: Option<String>,
) -> Result<()> {
    let mut responder = LazyResponder {
        config: Config::load_from(config_path)?,
        provider,
        model,
        responder: None,
    };

    println!();
    println!("{}", style(" docchat - Document Chat ").bold().reverse());
    print_help();

    let mut session = Session::new();
    if let Some(path) = file {
        load_document(&mut session, &path);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_prompt(&session)?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match parse_input(&line) {
            ChatInput::Blank => continue,
            ChatInput::Quit => break,
            ChatInput::Help => print_help(),
            ChatInput::Clear => {
                session.clear();
                println!("{}Document cleared", DOC);
            }
            ChatInput::Show => match session.document() {
                Some(document) => {
                    println!("{}{}", DOC, style(&document.name).cyan().bold());
                    println!("{}", style("━".repeat(50)).dim());
                    println!("{}", document.text);
                    println!("{}", style("━".repeat(50)).dim());
                }
                None => println!("{}", style("No document loaded.").yellow()),
            },
            ChatInput::Load("") => {
                println!("  Usage: {} <path>", style("/load").cyan());
            }
            ChatInput::Load(path) => load_document(&mut session, Path::new(path)),
            ChatInput::Unknown(command) => {
                println!(
                    "{}Unknown command {}. Type {} for help.",
                    WARN,
                    style(command).yellow(),
                    style("/help").cyan()
                );
            }
            ChatInput::Question(_) if session.state() == SessionState::NoDocument => {
                println!("{}{}", CROSS, style(RequestError::NoDocument).red());
                println!("  Load one with {} <path>", style("/load").cyan());
            }
            ChatInput::Question(question) => match responder.get() {
                Ok(responder) => answer(&session, responder, question).await,
                Err(err) => println!("{}{}", CROSS, style(format!("{:#}", err)).red()),
            },
        }
    }

    println!();
    Ok(())
}

fn print_prompt(session: &Session) -> Result<()> {
    match session.document() {
        Some(document) => print!(
            "{} {} ",
            style(format!("[{}]", document.name)).dim(),
            style("?").green().bold()
        ),
        None => print!("{} ", style("?").green().bold()),
    }
    io::stdout().flush()?;
    Ok(())
}

fn print_help() {
    println!();
    println!("  {} <path>  load a document", style("/load").cyan());
    println!("  {}         show the extracted text", style("/show").cyan());
    println!("  {}        discard the loaded document", style("/clear").cyan());
    println!("  {}         show this help", style("/help").cyan());
    println!("  {}         leave the chat", style("/quit").cyan());
    println!();
    println!(
        "  Supported file types: {}",
        style(ACCEPTED_EXTENSIONS.join(", ")).dim()
    );
    println!("  Anything else is sent as a question about the loaded document.");
    println!();
}

/// Load `path` into the session. Failures are reported and the session keeps
/// whatever document it had.
fn load_document(session: &mut Session, path: &Path) {
    let loaded = UploadedDocument::from_path(path).and_then(|upload| {
        session
            .upload(&upload)
            .map(|document| (document.name.clone(), document.text.chars().count()))
            .map_err(anyhow::Error::from)
    });

    match loaded {
        Ok((name, chars)) => println!(
            "{}Loaded {} ({} characters)",
            DOC,
            style(name).cyan(),
            chars
        ),
        Err(err) => {
            println!("{}{}", CROSS, style(format!("{:#}", err)).red());
            if let Some(document) = session.document() {
                println!("  Still using {}", style(&document.name).cyan());
            }
        }
    }
}

async fn answer(session: &Session, responder: &QueryResponder, question: &str) {
    let spinner = thinking_spinner(&BRAIN.to_string());
    let turn = session.ask(responder, question).await;
    spinner.finish_and_clear();

    match turn {
        Ok(turn) => {
            tracing::debug!(question = %turn.question, answer_chars = turn.answer.len(), "Chat turn");
            println!();
            println!("{}{}", ROBOT, style("AI Response:").bold());
            println!();
            println!("{}", turn.answer);
            println!();
        }
        Err(err) => println!("{}{}", CROSS, style(err).red()),
    }
}
