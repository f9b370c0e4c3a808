use super::types::*;
use crate::{
    Error, Result,
    config::{ProviderConfig, ProviderKind},
};
use async_openai::{Client, config::OpenAIConfig, error::OpenAIError, types as openai_types};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// The single seam between request handling and an upstream model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Sends one completion and returns the generated text.
    async fn send_completion(&self, request: CompletionRequest) -> Result<String>;
}

/// Chat-completions client for OpenAI and OpenAI-compatible hosts such as Groq.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    kind: ProviderKind,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .key()
            .ok_or_else(|| Error::config(format!("no API key configured for {}", config.kind)))?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(config.base_url());

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(no_retry());

        Ok(Self {
            client,
            kind: config.kind,
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn classify(&self, error: OpenAIError) -> Error {
        if let OpenAIError::ApiError(api_error) = &error {
            let message = api_error.message.to_lowercase();
            if message.contains("api key") || message.contains("authentication") {
                return Error::config(format!("{} rejected the configured API key", self.kind));
            }
        }
        Error::OpenAi(error)
    }
}

// A zero retry window makes async-openai give up after the first 5xx or 429.
fn no_retry() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..Default::default()
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    async fn send_completion(&self, request: CompletionRequest) -> Result<String> {
        debug!(
            "Creating {} chat completion with {} messages",
            self.kind,
            request.messages.len()
        );

        let messages = request
            .messages
            .iter()
            .map(ChatMessage::to_openai_message)
            .collect::<Result<Vec<_>>>()?;

        let mut request_builder = openai_types::CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(u32::from(request.max_tokens));

        let openai_request = request_builder.build()?;

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| self.classify(e))?;

        debug!(
            "Received {} chat completion with {} choices",
            self.kind,
            response.choices.len()
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::upstream(format!("{} returned no content", self.kind)))
    }
}
