// Mistral chat-completions client (HTTP direct, no SDK)

use crate::config::{self, MistralConfig};
use crate::error::{CompletionError, Result};
use crate::traits::CompletionClient;
use crate::types::ChatMessage;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

/// Client for the Mistral `/chat/completions` endpoint.
///
/// Model and sampling parameters are fixed at construction; every request
/// carries the same `model`, `temperature` and `max_tokens`.
pub struct MistralClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl MistralClient {
    /// Create a new client from configuration.
    ///
    /// The credential is checked for presence here, at startup, rather than
    /// on the first request.
    pub fn new(config: MistralConfig) -> Result<Self> {
        let api_key = config.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(CompletionError::MissingCredential);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| CompletionError::InvalidCredential)?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build completion HTTP client");
                CompletionError::Unavailable
            })?;

        Ok(Self {
            http_client,
            base_url: config
                .base_url
                .unwrap_or_else(|| config::DEFAULT_BASE_URL.to_string()),
            model: config.model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl CompletionClient for MistralClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "completion request failed to send");
                CompletionError::Unavailable
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::error!(%status, %body, "completion API returned an error");
            return Err(CompletionError::Unavailable);
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse completion response");
            CompletionError::Unavailable
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                tracing::error!("completion response contained no choices");
                CompletionError::Unavailable
            })?;

        Ok(content)
    }
}
