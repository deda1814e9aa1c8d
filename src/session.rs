use crate::error::{ExtractError, RequestError};
use crate::extract::{UploadedDocument, extract};
use crate::responder::QueryResponder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoDocument,
    DocumentReady,
}

/// Text of the currently loaded document
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub name: String,
    pub text: String,
}

/// One answered question. Turns are not kept by the session.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

/// Holds at most one extracted document for the lifetime of an interaction
#[derive(Debug, Default)]
pub struct Session {
    document: Option<LoadedDocument>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        match self.document {
            Some(_) => SessionState::DocumentReady,
            None => SessionState::NoDocument,
        }
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    /// Extract `upload` and make it the current document.
    ///
    /// On failure the previously loaded document, if any, stays current.
    pub fn upload(&mut self, upload: &UploadedDocument) -> Result<&LoadedDocument, ExtractError> {
        let text = extract(upload)?;

        tracing::info!(name = %upload.name, "Document loaded into session");
        Ok(self.document.insert(LoadedDocument {
            name: upload.name.clone(),
            text,
        }))
    }

    /// Discard the current document
    pub fn clear(&mut self) {
        if let Some(document) = self.document.take() {
            tracing::info!(name = %document.name, "Session cleared");
        }
    }

    /// Answer `question` against the current document
    pub async fn ask(
        &self,
        responder: &QueryResponder,
        question: &str,
    ) -> Result<ChatTurn, RequestError> {
        let document = self.document.as_ref().ok_or(RequestError::NoDocument)?;
        let answer = responder.respond(&document.text, question).await?;

        Ok(ChatTurn {
            question: question.to_string(),
            answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixtures;
    use crate::llm::LlmClient;
    use crate::responder::testing::StubModel;

    fn stub_responder(answer: &str) -> QueryResponder {
        QueryResponder::new(LlmClient::from_model(Box::new(StubModel::new(answer)), "stub"))
    }

    #[test]
    fn test_starts_without_document() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::NoDocument);
        assert!(session.document().is_none());
    }

    #[test]
    fn test_upload_then_clear() {
        let mut session = Session::new();
        let loaded = session
            .upload(&UploadedDocument::new("a.txt", "alpha"))
            .unwrap();
        assert_eq!(loaded.text, "alpha");
        assert_eq!(session.state(), SessionState::DocumentReady);

        session.clear();
        assert_eq!(session.state(), SessionState::NoDocument);
    }

    #[test]
    fn test_new_upload_replaces_previous() {
        let mut session = Session::new();
        session.upload(&UploadedDocument::new("a.txt", "alpha")).unwrap();
        session.upload(&UploadedDocument::new("b.md", "# beta")).unwrap();

        let document = session.document().unwrap();
        assert_eq!(document.name, "b.md");
        assert_eq!(document.text, "beta");
    }

    #[test]
    fn test_failed_upload_keeps_previous_document() {
        let mut session = Session::new();
        session.upload(&UploadedDocument::new("a.txt", "alpha")).unwrap();

        let failures = [
            UploadedDocument::new("broken.pdf", "not a pdf"),
            UploadedDocument::new("letter.rtf", "{\\rtf1 hi}"),
            UploadedDocument::new("blank.txt", "   "),
        ];
        for upload in &failures {
            assert!(session.upload(upload).is_err());
            assert_eq!(session.state(), SessionState::DocumentReady);
            assert_eq!(session.document().unwrap().text, "alpha");
        }
    }

    #[test]
    fn test_failed_first_upload_stays_empty() {
        let mut session = Session::new();
        assert!(session.upload(&UploadedDocument::new("x.rtf", "{\\rtf1}")).is_err());
        assert_eq!(session.state(), SessionState::NoDocument);
    }

    #[tokio::test]
    async fn test_ask_without_document() {
        let session = Session::new();
        let err = session.ask(&stub_responder("unused"), "hello?").await.unwrap_err();
        assert!(matches!(err, RequestError::NoDocument));
    }

    #[tokio::test]
    async fn test_ask_keeps_state() {
        let mut session = Session::new();
        session.upload(&UploadedDocument::new("a.txt", "alpha")).unwrap();

        let turn = session.ask(&stub_responder("It is alpha."), "What is it?").await.unwrap();
        assert_eq!(turn.question, "What is it?");
        assert_eq!(turn.answer, "It is alpha.");
        assert_eq!(session.state(), SessionState::DocumentReady);
    }

    #[tokio::test]
    async fn test_two_page_pdf_end_to_end() {
        let mut session = Session::new();
        let pdf = fixtures::pdf(&[&["Hello", "World"], &["Hello", "World"]]);

        let loaded = session.upload(&UploadedDocument::new("hello.pdf", pdf)).unwrap();
        assert_eq!(loaded.text, "Hello\nWorld\nHello\nWorld");

        let stub = StubModel::new("It says hello world twice.");
        let sent = stub.prompts.clone();
        let responder = QueryResponder::new(LlmClient::from_model(Box::new(stub), "stub"));

        let turn = session.ask(&responder, "What does it say?").await.unwrap();
        assert_eq!(turn.answer, "It says hello world twice.");

        let prompts = sent.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("Document Content:\nHello\nWorld\nHello\nWorld\n\n"));
        assert!(prompts[0].contains("User Question: What does it say?"));
    }
}
