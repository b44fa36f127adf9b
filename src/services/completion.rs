// src/services/completion.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::provider::{check_status, with_retry};
use crate::{
    config::{CompletionConfig, ProviderSettings},
    error::ProviderError,
};

pub const FALLBACK_PREFIX: &str = "Checking outside... ";

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Single-turn completion. No history is carried between calls.
    async fn complete(&self, message: &str) -> Result<String, ProviderError>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiCompletion {
    client: Client,
    config: CompletionConfig,
    settings: ProviderSettings,
}

impl OpenAiCompletion {
    pub fn new(client: Client, config: CompletionConfig, settings: ProviderSettings) -> Self {
        Self { client, config, settings }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletion {
    async fn complete(&self, message: &str) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(ProviderError::MissingCredential("OpenAI"))?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: [ChatMessage { role: "user", content: message }],
        };
        let (client, url, body) = (&self.client, &url, &body);

        let resp = with_retry(&self.settings, "openai", move || async move {
            let resp = client
                .post(url)
                .bearer_auth(api_key.expose())
                .json(body)
                .send()
                .await?;
            check_status(resp).await
        })
        .await?;

        let data: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("no completion choices".into()))
    }
}

/// Answers lookup misses through the completion provider. Never fails.
pub struct FallbackResponder {
    provider: Box<dyn CompletionProvider>,
}

/// How a fallback reply came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackOutcome {
    Completed,
    Failed,
}

impl FallbackResponder {
    pub fn new(provider: Box<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub async fn respond(&self, message: &str) -> (String, FallbackOutcome) {
        match self.provider.complete(message).await {
            Ok(text) => (format!("{FALLBACK_PREFIX}{text}"), FallbackOutcome::Completed),
            Err(e) => {
                tracing::warn!(error = %e, "completion provider failed");
                (
                    format!("Sorry, I couldn't reach the assistant right now ({}).", e.summary()),
                    FallbackOutcome::Failed,
                )
            }
        }
    }
}
