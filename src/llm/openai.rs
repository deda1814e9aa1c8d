use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatModel, GenerationSettings};

/// Client for OpenAI-compatible chat completion APIs (OpenAI, Groq, ...)
pub struct OpenAIProvider {
    client: Client,
    label: &'static str,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAIProvider {
    pub fn new(
        label: &'static str,
        api_key: &str,
        model: &str,
        base_url: Option<&str>,
        settings: &GenerationSettings,
    ) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!(
                "{} API key is required. Set {}_API_KEY environment variable.",
                label,
                label.to_uppercase()
            );
        }

        Ok(Self {
            client: settings.http_client()?,
            label,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url
                .unwrap_or("https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIProvider {
    async fn complete(&self, system: &str, user_message: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {} API", self.label))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("{} API error ({}): {}", self.label, status, error_text);
        }

        let response: OpenAIResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", self.label))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .with_context(|| format!("No content in {} response", self.label))
    }

    fn name(&self) -> &'static str {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn settings() -> GenerationSettings {
        GenerationSettings {
            max_tokens: 256,
            temperature: 0.0,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_complete_sends_system_then_user() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer gsk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gemma2-9b-it",
                "max_tokens": 256,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#)
            .create_async()
            .await;

        let provider =
            OpenAIProvider::new("groq", "gsk-test", "gemma2-9b-it", Some(&server.url()), &settings())
                .unwrap();
        let answer = provider.complete("be brief", "hi").await.unwrap();

        assert_eq!(answer, "hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_includes_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid API Key"}}"#)
            .create_async()
            .await;

        let provider =
            OpenAIProvider::new("groq", "bad", "gemma2-9b-it", Some(&server.url()), &settings())
                .unwrap();
        let err = provider.complete("sys", "user").await.unwrap_err();
        let message = err.to_string();

        assert!(message.contains("401"), "{message}");
        assert!(message.contains("Invalid API Key"), "{message}");
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let provider =
            OpenAIProvider::new("openai", "sk-test", "gpt-4o", Some(&server.url()), &settings())
                .unwrap();
        let err = provider.complete("sys", "user").await.unwrap_err();
        assert!(err.to_string().contains("No content in openai response"));
    }

    #[test]
    fn test_requires_api_key() {
        let err = OpenAIProvider::new("groq", "", "gemma2-9b-it", None, &settings())
            .err()
            .unwrap();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }
}
