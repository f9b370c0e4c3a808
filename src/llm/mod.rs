mod chain;
mod client;
mod gemini;
mod types;

pub use chain::ProviderChain;
pub use client::*;
pub use gemini::GeminiClient;
pub use types::*;

use crate::{
    Result,
    config::{LlmConfig, ProviderKind},
};
use std::sync::Arc;
use tracing::info;

/// Builds the client for every provider that has a key, in priority order.
/// Returns `None` when no provider is configured.
pub fn build_client(config: &LlmConfig) -> Result<Option<Arc<dyn LlmClient>>> {
    let timeout = config.timeout();
    let mut providers: Vec<Box<dyn LlmClient>> = Vec::new();

    for provider in config.configured_providers() {
        let client: Box<dyn LlmClient> = match provider.kind {
            ProviderKind::Gemini => Box::new(GeminiClient::new(provider, timeout)?),
            ProviderKind::Groq | ProviderKind::OpenAi => {
                Box::new(OpenAiClient::new(provider, timeout)?)
            }
        };
        info!(
            "Configured LLM provider '{}' with model '{}'",
            provider.kind, provider.model
        );
        providers.push(client);
    }

    let client: Option<Arc<dyn LlmClient>> = match providers.len() {
        0 => None,
        1 => providers.pop().map(Arc::from),
        _ => Some(Arc::new(
            ProviderChain::new(providers).with_attempt_timeout(timeout),
        )),
    };

    Ok(client)
}
