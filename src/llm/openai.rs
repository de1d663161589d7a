//! Chat-completions API client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint.
//! Uses a long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::config::ModelConfig;
use crate::error::ChatError;
use crate::llm::{ChatMessage, ChatModel};
use crate::Result;

/// Reusable chat-completions client (connection-pooled)
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ChatError::Config("OPENAI_API_KEY not configured".to_string()))?;

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        info!(model = %self.model, messages = messages.len(), "Calling chat-completions API");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Chat-completions request failed: {}", e);
                ChatError::Generation(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Chat-completions error response ({}): {}", status, error_text);
            return Err(ChatError::Generation(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse chat-completions response: {}", e);
            ChatError::Generation(format!("parse error: {}", e))
        })?;

        extract_answer(completion)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn extract_answer(completion: CompletionResponse) -> Result<String> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::Generation("No choices in response".to_string()))?;

    if let Some(usage) = completion.usage {
        info!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            "Chat-completions response received"
        );
    }

    choice
        .message
        .content
        .ok_or_else(|| ChatError::Generation("Empty message content".to_string()))
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let messages = vec![
            ChatMessage::system("You are helpful"),
            ChatMessage::user("What did I say about cats?"),
        ];
        let request = CompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.0,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "What did I say about cats?");
    }

    #[test]
    fn test_extract_answer() {
        let completion: CompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello there"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }))
        .unwrap();

        assert_eq!(extract_answer(completion).unwrap(), "Hello there");
    }

    #[test]
    fn test_extract_answer_without_choices() {
        let completion: CompletionResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();

        let err = extract_answer(completion).unwrap_err();
        assert!(err.is_generation());
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let result = OpenAiClient::from_config(&ModelConfig::default());
        assert!(matches!(result, Err(ChatError::Config(_))));
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = ModelConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://localhost:11434/v1/".to_string(),
            ..ModelConfig::default()
        };
        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }
}
