pub mod fallback;
mod prompt;

pub use prompt::SYSTEM_PROMPT;

use crate::{
    Error, Result,
    config::LlmConfig,
    llm::{self, CompletionRequest, LlmClient},
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, warn};

/// What the relay hands back for a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Set when the text is a canned reply rather than model output.
    pub fallback: bool,
}

/// Forwards one user message to the upstream model with the system prompt and
/// returns the reply. Holds no per-request state.
pub struct Relay {
    client: Option<Arc<dyn LlmClient>>,
    system_prompt: String,
    timeout: Duration,
    max_tokens: u16,
    temperature: f32,
}

impl Relay {
    pub fn new(client: Option<Arc<dyn LlmClient>>) -> Self {
        let defaults = LlmConfig::default();
        Self {
            client,
            system_prompt: SYSTEM_PROMPT.to_string(),
            timeout: defaults.timeout(),
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = llm::build_client(config)?;
        if client.is_none() {
            warn!(
                "No LLM provider API key configured; chat requests will fail until one is set \
                 (GEMINI_API_KEY, GROQ_API_KEY or OPENAI_API_KEY)"
            );
        }

        let mut relay = Self::new(client)
            .with_timeout(config.request_budget())
            .with_generation(config.max_tokens, config.temperature);
        if let Some(prompt) = config.system_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            relay.system_prompt = prompt.to_string();
        }

        Ok(relay)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_generation(mut self, max_tokens: u16, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Relays `message` upstream.
    ///
    /// Empty input is a validation error and a missing provider is a
    /// configuration error; neither reaches the network. Upstream failures
    /// and timeouts are absorbed into a fallback reply.
    pub async fn respond(&self, message: &str) -> Result<Reply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::validation("message must not be empty"));
        }

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| Error::config("no LLM provider API key configured"))?;

        let request = CompletionRequest::new(self.system_prompt.as_str(), message)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        debug!("Relaying message of {} bytes", message.len());

        let outcome = match tokio::time::timeout(self.timeout, client.send_completion(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.timeout)),
        };

        match outcome {
            Ok(text) if !text.trim().is_empty() => Ok(Reply {
                text,
                fallback: false,
            }),
            Ok(_) => {
                warn!("Upstream returned an empty reply, using fallback");
                Ok(Self::fallback(message))
            }
            Err(e) if e.is_config() => {
                error!("LLM provider configuration problem: {}", e);
                Err(e)
            }
            Err(e) => {
                warn!("Upstream completion failed, using fallback: {}", e);
                Ok(Self::fallback(message))
            }
        }
    }

    fn fallback(message: &str) -> Reply {
        Reply {
            text: fallback::reply_for(message).to_string(),
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLlmClient, Role};
    use pretty_assertions::assert_eq;

    fn relay_with(mock: MockLlmClient) -> Relay {
        Relay::new(Some(Arc::new(mock)))
    }

    #[tokio::test]
    async fn test_reply_is_returned_verbatim() {
        let mut mock = MockLlmClient::new();
        mock.expect_send_completion()
            .withf(|request| {
                request.messages.len() == 2
                    && request.messages[0].role == Role::System
                    && request.messages[0].content == SYSTEM_PROMPT
                    && request.messages[1].content == "I feel lonely"
            })
            .times(1)
            .returning(|_| Ok("  That sounds hard. I'm here.  ".to_string()));

        let reply = relay_with(mock).respond("  I feel lonely ").await.unwrap();

        assert_eq!(reply.text, "  That sounds hard. I'm here.  ");
        assert!(!reply.fallback);
    }

    #[tokio::test]
    async fn test_empty_message_never_reaches_provider() {
        let mut mock = MockLlmClient::new();
        mock.expect_send_completion().times(0);
        let relay = relay_with(mock);

        assert!(matches!(relay.respond("").await, Err(Error::Validation(_))));
        assert!(matches!(relay.respond(" \n\t").await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_relay_is_config_error() {
        let relay = Relay::new(None);
        assert!(!relay.is_configured());

        let err = relay.respond("Hi").await.unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_upstream_failure_uses_fallback() {
        let mut mock = MockLlmClient::new();
        mock.expect_send_completion()
            .times(1)
            .returning(|_| Err(Error::upstream("connection reset")));

        let reply = relay_with(mock).respond("I'm so stressed").await.unwrap();

        assert!(reply.fallback);
        assert_eq!(reply.text, fallback::reply_for("I'm so stressed"));
    }

    #[tokio::test]
    async fn test_blank_provider_reply_uses_fallback() {
        let mut mock = MockLlmClient::new();
        mock.expect_send_completion()
            .returning(|_| Ok("   ".to_string()));

        let reply = relay_with(mock).respond("Hi").await.unwrap();
        assert!(reply.fallback);
    }

    #[tokio::test]
    async fn test_provider_config_error_propagates() {
        let mut mock = MockLlmClient::new();
        mock.expect_send_completion()
            .returning(|_| Err(Error::config("key rejected")));

        let err = relay_with(mock).respond("Hi").await.unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_generation_settings_are_forwarded() {
        let mut mock = MockLlmClient::new();
        mock.expect_send_completion()
            .withf(|request| request.max_tokens == 120 && request.temperature == 0.2)
            .returning(|_| Ok("ok".to_string()));

        let relay = relay_with(mock).with_generation(120, 0.2);
        assert_eq!(relay.respond("Hi").await.unwrap().text, "ok");
    }

    #[test]
    fn test_budget_covers_every_configured_provider() {
        let mut config = LlmConfig {
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        assert_eq!(Relay::from_config(&config).unwrap().timeout, Duration::from_secs(5));

        config.provider_mut(crate::config::ProviderKind::Gemini).api_key = Some("g".to_string());
        config.provider_mut(crate::config::ProviderKind::OpenAi).api_key = Some("sk".to_string());
        assert_eq!(Relay::from_config(&config).unwrap().timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_config_system_prompt_override() {
        let config = LlmConfig {
            system_prompt: Some("Answer gently.".to_string()),
            ..LlmConfig::default()
        };

        let relay = Relay::from_config(&config).unwrap();
        assert_eq!(relay.system_prompt(), "Answer gently.");
        assert!(!relay.is_configured());
    }
}
