use std::borrow::Cow;
use tracing::{info, warn};

use crate::error::RequestError;
use crate::llm::LlmClient;
use crate::llm::prompts::{DOCUMENT_QA_SYSTEM_PROMPT, document_question_prompt};

/// Answers questions about a document by forwarding both to a chat model.
///
/// Every call is independent: the full document text is sent with each
/// question and nothing is remembered between calls.
pub struct QueryResponder {
    client: LlmClient,
    max_document_chars: Option<usize>,
}

impl QueryResponder {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            max_document_chars: None,
        }
    }

    /// Cap the number of document characters placed in each prompt
    pub fn with_max_document_chars(mut self, max_document_chars: Option<usize>) -> Self {
        self.max_document_chars = max_document_chars;
        self
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }

    pub async fn respond(&self, document_text: &str, question: &str) -> Result<String, RequestError> {
        if question.trim().is_empty() {
            return Err(RequestError::EmptyQuestion);
        }

        let document_text = self.fit_document(document_text);
        let user_prompt = document_question_prompt(&document_text, question);

        info!(
            provider = self.client.provider_name(),
            model = self.client.model(),
            prompt_chars = user_prompt.len(),
            "Sending question to model"
        );

        let answer = self
            .client
            .complete(DOCUMENT_QA_SYSTEM_PROMPT, &user_prompt)
            .await?;

        if answer.trim().is_empty() {
            return Err(RequestError::Api("Model returned an empty response".to_string()));
        }

        Ok(answer)
    }

    fn fit_document<'a>(&self, document_text: &'a str) -> Cow<'a, str> {
        let Some(limit) = self.max_document_chars else {
            return Cow::Borrowed(document_text);
        };

        match document_text.char_indices().nth(limit) {
            Some((cut, _)) => {
                warn!(
                    limit,
                    total_chars = document_text.chars().count(),
                    "Document exceeds max_document_chars, truncating prompt"
                );
                Cow::Owned(document_text[..cut].to_string())
            }
            None => Cow::Borrowed(document_text),
        }
    }
}
