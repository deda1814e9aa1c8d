use anyhow::{Context, Result};
use docx_rs::{DocumentChild, InsertChild, MoveToChild, Paragraph, ParagraphChild, Run, RunChild};

/// Extract text from a DOCX: one line per top-level body paragraph
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let docx = docx_rs::read_docx(bytes).context("Failed to read DOCX document")?;

    // Tables and other block content are not paragraphs of the body
    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children_text(&paragraph.children, &mut text);
    text
}

/// Runs nested in hyperlinks and tracked insertions are part of the paragraph
fn push_children_text(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run_text(run, text),
            ParagraphChild::Hyperlink(link) => push_children_text(&link.children, text),
            ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let InsertChild::Run(run) = child {
                        push_run_text(run, text);
                    }
                }
            }
            ParagraphChild::MoveTo(moved) => {
                for child in &moved.children {
                    if let MoveToChild::Run(run) = child {
                        push_run_text(run, text);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run_text(run: &Run, text: &mut String) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixtures;
    use docx_rs::{Docx, Hyperlink, HyperlinkType, Insert};
    use std::io::Cursor;

    #[test]
    fn test_paragraphs_on_separate_lines() {
        let bytes = fixtures::docx(&["Alpha", "Beta", "Gamma"]);
        assert_eq!(extract_text(&bytes).unwrap(), "Alpha\nBeta\nGamma");
    }

    #[test]
    fn test_runs_are_concatenated() {
        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text("Hello, "))
            .add_run(Run::new().add_text("World").bold())
            .add_run(Run::new().add_tab().add_text("!"));

        let text = extract_text(&pack(paragraph)).unwrap();
        assert_eq!(text, "Hello, World\t!");
    }

    fn pack(paragraph: Paragraph) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(paragraph)
            .build()
            .pack(&mut cursor)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_hyperlink_text_is_kept() {
        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text("See "))
            .add_hyperlink(
                Hyperlink::new("details", HyperlinkType::Anchor)
                    .add_run(Run::new().add_text("our website")),
            )
            .add_run(Run::new().add_text(" for details."));

        let text = extract_text(&pack(paragraph)).unwrap();
        assert_eq!(text, "See our website for details.");
    }

    #[test]
    fn test_tracked_insertion_text_is_kept() {
        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text("Draft "))
            .add_insert(Insert::new(Run::new().add_text("two")));

        let text = extract_text(&pack(paragraph)).unwrap();
        assert_eq!(text, "Draft two");
    }

    #[test]
    fn test_not_a_docx() {
        assert!(extract_text(b"plain text pretending to be docx").is_err());
    }
}
