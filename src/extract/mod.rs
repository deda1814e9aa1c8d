mod docx;
mod epub;
mod html;
mod markdown;
mod pdf;
mod text;
mod xlsx;

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::ExtractError;

/// Extensions a user may upload. `rtf` is accepted but has no decoder.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["xlsx", "pdf", "docx", "rtf", "txt", "html", "epub", "md"];

/// A file as handed over by the user: its name (with extension) and raw bytes
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub content: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a document from disk, keeping only the file name
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Ok(Self::new(name, content))
    }

    pub fn format(&self) -> DocumentFormat {
        DocumentFormat::from_name(&self.name)
    }
}

/// Format tag used to pick a decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
    Html,
    Epub,
    Markdown,
    Xlsx,
    Unsupported(String),
}

impl DocumentFormat {
    /// Classify by the lowercased text after the last '.' of the name.
    /// A name without a dot is classified by the whole name.
    pub fn from_name(name: &str) -> Self {
        let extension = name.rsplit('.').next().unwrap_or("").to_lowercase();

        match extension.as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" => Self::Txt,
            "html" => Self::Html,
            "epub" => Self::Epub,
            "md" => Self::Markdown,
            "xlsx" => Self::Xlsx,
            _ => Self::Unsupported(extension),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Docx => write!(f, "docx"),
            DocumentFormat::Txt => write!(f, "txt"),
            DocumentFormat::Html => write!(f, "html"),
            DocumentFormat::Epub => write!(f, "epub"),
            DocumentFormat::Markdown => write!(f, "md"),
            DocumentFormat::Xlsx => write!(f, "xlsx"),
            DocumentFormat::Unsupported(ext) => write!(f, "{}", ext),
        }
    }
}

/// Extract trimmed plain text from a document.
///
/// Either the whole document decodes or an error is returned; partial text
/// never leaves this function.
pub fn extract(document: &UploadedDocument) -> Result<String, ExtractError> {
    let format = document.format();
    debug!(
        name = %document.name,
        bytes = document.content.len(),
        %format,
        "Dispatching document to decoder"
    );

    let bytes = document.content.as_slice();
    let decoded = match &format {
        DocumentFormat::Pdf => pdf::extract_text(bytes),
        DocumentFormat::Docx => docx::extract_text(bytes),
        DocumentFormat::Txt => text::extract_text(bytes),
        DocumentFormat::Html => html::extract_text(bytes),
        DocumentFormat::Epub => epub::extract_text(bytes),
        DocumentFormat::Markdown => markdown::extract_text(bytes),
        DocumentFormat::Xlsx => xlsx::extract_text(bytes),
        DocumentFormat::Unsupported(extension) => {
            return Err(ExtractError::UnsupportedFormat(extension.clone()));
        }
    };

    let text = decoded.map_err(|e| {
        warn!(name = %document.name, error = %e, "Decoder failed");
        ExtractError::Decode {
            format: format.clone(),
            message: format!("{:#}", e),
        }
    })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::Empty(document.name.clone()));
    }

    info!(name = %document.name, chars = text.chars().count(), "Extracted document text");
    Ok(text.to_string())
}
