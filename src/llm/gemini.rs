//! Google Gemini `generateContent` client.
//!
//! The Gemini wire format differs from chat-completions: the system
//! instruction travels separately and replies come back as candidate parts.

use super::{CompletionRequest, LlmClient};
use crate::{Error, Result, config::ProviderConfig};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .key()
            .ok_or_else(|| Error::config(format!("no API key configured for {}", config.kind)))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn send_completion(&self, request: CompletionRequest) -> Result<String> {
        let payload = GenerateContentRequest {
            system_instruction: request.system_prompt().map(Content::system),
            contents: request
                .user_messages()
                .map(|m| Content::user(m.content.clone()))
                .collect(),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        };

        debug!(
            "Sending gemini generateContent request to model {}",
            self.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gemini request failed with status {}", status);
            return Err(classify_status(status, &body));
        }

        let parsed: GenerateContentResponse = response.json().await?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::upstream("gemini returned no candidate text"));
        }

        Ok(text)
    }
}

fn classify_status(status: StatusCode, body: &str) -> Error {
    let key_rejected = body.contains("API_KEY_INVALID") || body.contains("API key not valid");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::config("gemini rejected the configured API key")
        }
        StatusCode::BAD_REQUEST if key_rejected => {
            Error::config("gemini rejected the configured API key")
        }
        StatusCode::TOO_MANY_REQUESTS => Error::upstream("gemini rate limited the request"),
        _ => Error::upstream(format!("gemini responded with status {status}")),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn system(text: String) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: Some(text) }],
        }
    }

    fn user(text: String) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part { text: Some(text) }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u16,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}
