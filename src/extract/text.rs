use anyhow::{Context, Result};

/// Decode a plain text upload; bytes must be valid UTF-8
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let content = std::str::from_utf8(bytes).context("Text file is not valid UTF-8")?;

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text() {
        let text = extract_text("Hello, World!\n".as_bytes()).unwrap();
        assert!(text.contains("Hello, World!"));
    }

    #[test]
    fn test_extract_text_keeps_unicode() {
        let text = extract_text("naïve café ✓".as_bytes()).unwrap();
        assert_eq!(text, "naïve café ✓");
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = extract_text(&[0x66, 0x6f, 0xc3, 0x28]).unwrap_err();
        assert!(format!("{:#}", err).contains("not valid UTF-8"));
    }
}
