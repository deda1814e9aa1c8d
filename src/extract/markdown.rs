use anyhow::{Context, Result};
use pulldown_cmark::{Options, Parser, html};

use super::html::html_to_text;

/// Extract plain text from a Markdown upload.
///
/// The source is rendered to HTML first and the markup is then stripped, so
/// the prompt sees the rendered text rather than tags or Markdown syntax.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let content = std::str::from_utf8(bytes).context("Markdown file is not valid UTF-8")?;

    Ok(markdown_to_text(content))
}

fn markdown_to_text(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut rendered = String::new();
    html::push_html(&mut rendered, parser);

    html_to_text(&rendered)
}
