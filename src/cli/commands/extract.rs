use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;
use std::path::PathBuf;

use crate::extract::{UploadedDocument, extract};

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");

pub async fn run(file: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let upload = UploadedDocument::from_path(&file)?;
    let text = extract(&upload)?;

    match output {
        Some(path) => {
            fs::write(&path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{}Extracted {} characters from {} into {}",
                CHECK,
                style(text.chars().count()).green(),
                style(&upload.name).cyan(),
                style(path.display()).cyan()
            );
        }
        // Plain text only, so the output can be piped
        None => println!("{}", text),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extract_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.html");
        let output = dir.path().join("page.txt");
        fs::write(&input, "<html><body><h1>Title</h1><p>Body text</p></body></html>").unwrap();

        run(input, Some(output.clone())).await.unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "Title\nBody text");
    }

    #[tokio::test]
    async fn test_extract_unsupported_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("letter.rtf");
        fs::write(&input, "{\\rtf1 hello}").unwrap();

        let err = run(input, None).await.unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));
    }
}
