use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

/// Extract visible text from an HTML upload
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let content = String::from_utf8_lossy(bytes);

    Ok(html_to_text(&content))
}

/// Convert HTML to plain text, one line per block element
pub(crate) fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut text_parts = Vec::new();

    let mut found_body = false;
    if let Ok(selector) = Selector::parse("body")
        && let Some(element) = document.select(&selector).next()
    {
        extract_element_text(&element, &mut text_parts);
        found_body = true;
    }

    if !found_body {
        // Fall back to extracting from root
        extract_element_text(&document.root_element(), &mut text_parts);
    }

    clean_html_text(&text_parts)
}

fn extract_element_text(element: &ElementRef, parts: &mut Vec<String>) {
    // Skip elements that never render as text
    let tag_name = element.value().name();
    if matches!(tag_name, "script" | "style" | "noscript" | "head" | "template") {
        return;
    }

    for node in element.children() {
        if let Some(text) = node.value().as_text() {
            parts.push(text.to_string());
        } else if let Some(child_element) = ElementRef::wrap(node) {
            extract_element_text(&child_element, parts);

            // Block elements end the current line, cells are kept apart
            let child_tag = child_element.value().name();
            if is_block(child_tag) {
                parts.push("\n".to_string());
            } else if matches!(child_tag, "td" | "th") {
                parts.push(" ".to_string());
            }
        }
    }
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "br"
            | "tr"
            | "pre"
            | "blockquote"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "table"
            | "ul"
            | "ol"
            | "dt"
            | "dd"
            | "hr"
    )
}

/// Cut text runs into lines at block markers, collapse whitespace inside each
/// line and drop blank lines
fn clean_html_text(parts: &[String]) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();

    for part in parts {
        if part == "\n" {
            push_line(&mut lines, &current);
            current.clear();
        } else {
            current.push_str(part);
        }
    }
    push_line(&mut lines, &current);

    lines.join("\n")
}

fn push_line(lines: &mut Vec<String>, raw: &str) {
    let line = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !line.is_empty() {
        lines.push(line);
    }
}
