/// System prompt for answering questions about a single document
pub const DOCUMENT_QA_SYSTEM_PROMPT: &str = r#"You are an AI assistant helping to analyze documents.
Below is the document content followed by a user question.
Please provide a detailed and accurate response based solely on the document content."#;

/// User prompt combining the document and the question
pub fn document_question_prompt(document_text: &str, question: &str) -> String {
    format!(
        "Document Content:\n{}\n\nUser Question: {}\n\nPlease answer the question based on the document content above.",
        document_text, question
    )
}
