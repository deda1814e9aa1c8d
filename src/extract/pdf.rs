use anyhow::{Context, Result, anyhow};

/// Extract text from an in-memory PDF, one cleaned block per page joined by newlines
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed inputs instead of returning an error
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| anyhow!("PDF decoder aborted on malformed input"))?
        .context("Failed to extract text from PDF")?;

    tracing::debug!(pages = pages.len(), "Decoded PDF pages");

    Ok(pages
        .iter()
        .map(|page| clean_pdf_text(page))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Clean up extracted PDF text
fn clean_pdf_text(text: &str) -> String {
    text.lines()
        // Remove empty lines and whitespace-only lines
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        // Normalize whitespace
        .replace("  ", " ")
        // Remove common PDF artifacts
        .replace('\u{0}', "")
        .replace('\u{FEFF}', "")
}
