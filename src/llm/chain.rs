use super::{CompletionRequest, LlmClient};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Tries each provider in priority order and returns the first reply.
///
/// With an attempt timeout set, a provider that hangs counts as failed once
/// the timeout passes and the next one is tried.
pub struct ProviderChain {
    providers: Vec<Box<dyn LlmClient>>,
    attempt_timeout: Option<Duration>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn LlmClient>>) -> Self {
        Self {
            providers,
            attempt_timeout: None,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    async fn attempt(&self, provider: &dyn LlmClient, request: CompletionRequest) -> Result<String> {
        match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, provider.send_completion(request))
                .await
                .unwrap_or(Err(Error::Timeout(limit))),
            None => provider.send_completion(request).await,
        }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl LlmClient for ProviderChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn send_completion(&self, request: CompletionRequest) -> Result<String> {
        let mut failures = Vec::with_capacity(self.providers.len());
        let mut all_config = true;

        for provider in &self.providers {
            match self.attempt(provider.as_ref(), request.clone()).await {
                Ok(text) => {
                    debug!("Provider '{}' produced a reply", provider.name());
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Provider '{}' failed: {}", provider.name(), e);
                    all_config &= e.is_config();
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        if failures.is_empty() {
            return Err(Error::config("no LLM providers configured"));
        }

        let summary = failures.join("; ");
        if all_config {
            Err(Error::config(summary))
        } else {
            Err(Error::upstream(summary))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    struct Canned {
        name: &'static str,
        outcome: fn() -> Result<String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LlmClient for Canned {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn send_completion(&self, _request: CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn canned(name: &'static str, outcome: fn() -> Result<String>) -> (Box<dyn LlmClient>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = Canned {
            name,
            outcome,
            calls: calls.clone(),
        };
        (Box::new(client), calls)
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("Be supportive", "Hello")
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let (first, first_calls) = canned("gemini", || Ok("from gemini".to_string()));
        let (second, second_calls) = canned("openai", || Ok("from openai".to_string()));
        let chain = ProviderChain::new(vec![first, second]);

        assert_eq!(chain.send_completion(request()).await.unwrap(), "from gemini");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_next_provider() {
        let (first, _) = canned("gemini", || Err(Error::upstream("quota exceeded")));
        let (second, second_calls) = canned("groq", || Ok("from groq".to_string()));
        let chain = ProviderChain::new(vec![first, second]);

        assert_eq!(chain.send_completion(request()).await.unwrap(), "from groq");
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_config_failures_stay_config() {
        let (first, _) = canned("gemini", || Err(Error::config("bad key")));
        let (second, _) = canned("openai", || Err(Error::config("bad key")));
        let chain = ProviderChain::new(vec![first, second]);

        let err = chain.send_completion(request()).await.unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("gemini"));
        assert!(err.to_string().contains("openai"));
    }

    #[tokio::test]
    async fn test_mixed_failures_are_upstream() {
        let (first, _) = canned("gemini", || Err(Error::config("bad key")));
        let (second, _) = canned("openai", || Err(Error::upstream("503")));
        let chain = ProviderChain::new(vec![first, second]);

        assert!(chain.send_completion(request()).await.unwrap_err().is_upstream());
    }

    struct Hanging;

    #[async_trait]
    impl LlmClient for Hanging {
        fn name(&self) -> &'static str {
            "gemini"
        }

        async fn send_completion(&self, _request: CompletionRequest) -> Result<String> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_hanging_provider_is_skipped_after_attempt_timeout() {
        let (second, second_calls) = canned("openai", || Ok("from openai".to_string()));
        let providers: Vec<Box<dyn LlmClient>> = vec![Box::new(Hanging), second];
        let chain = ProviderChain::new(providers).with_attempt_timeout(Duration::from_millis(50));

        assert_eq!(chain.send_completion(request()).await.unwrap(), "from openai");
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_hanging_providers_time_out_as_upstream() {
        let providers: Vec<Box<dyn LlmClient>> = vec![Box::new(Hanging)];
        let chain = ProviderChain::new(providers).with_attempt_timeout(Duration::from_millis(20));

        let err = chain.send_completion(request()).await.unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_empty_chain_is_config_error() {
        let chain = ProviderChain::new(Vec::new());
        assert!(chain.is_empty());
        assert!(chain.send_completion(request()).await.unwrap_err().is_config());
    }
}
