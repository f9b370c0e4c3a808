use async_trait::async_trait;
use solace_relay::{
    Error, Result,
    llm::{CompletionRequest, LlmClient},
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the stub provider answers every call.
#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(String),
    Fail(String),
    RejectKey,
    Hang,
}

/// Stub LLM client for testing. Records every request it receives.
#[derive(Debug, Clone)]
pub struct StubLlmClient {
    behavior: Behavior,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl StubLlmClient {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Behavior::Reply(text.to_string()))
    }

    pub fn failing(error: &str) -> Self {
        Self::new(Behavior::Fail(error.to_string()))
    }

    pub fn hanging() -> Self {
        Self::new(Behavior::Hang)
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for StubLlmClient {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn send_completion(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);

        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(error) => Err(Error::upstream(error.clone())),
            Behavior::RejectKey => Err(Error::config("stub rejected the API key")),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::upstream("stub woke up"))
            }
        }
    }
}
