use thiserror::Error;

use crate::extract::DocumentFormat;

/// Failure to turn an uploaded document into prompt-ready text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Error processing {format} file: {message}")]
    Decode {
        format: DocumentFormat,
        message: String,
    },

    #[error("Unsupported file type: '{0}' (supported: pdf, docx, txt, html, epub, md, xlsx)")]
    UnsupportedFormat(String),

    #[error("No text could be extracted from '{0}'")]
    Empty(String),
}

/// Failure to get an answer from the model.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Error generating response: {0}")]
    Api(String),

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("No document loaded. Upload a document first.")]
    NoDocument,
}

impl From<anyhow::Error> for RequestError {
    fn from(err: anyhow::Error) -> Self {
        // Alternate formatting keeps the whole context chain in one line
        RequestError::Api(format!("{:#}", err))
    }
}
