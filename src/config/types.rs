use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Upper bound for a single provider call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u16,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Providers in priority order.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    Groq,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Groq => "groq",
            Self::OpenAi => "openai",
        }
    }

    /// Prefix of the environment variables that configure this provider.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI",
            Self::Groq => "GROQ",
            Self::OpenAi => "OPENAI",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::Groq => "llama-3.3-70b-versatile",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            model: kind.default_model().to_string(),
            base_url: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The API key, if one is set and not blank.
    pub fn key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.kind.default_base_url())
    }
}

// Keys must never end up in logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.key().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Time allowed for one relayed message: each configured provider gets
    /// its own `timeout()` in turn.
    pub fn request_budget(&self) -> Duration {
        let attempts = self.configured_providers().count().max(1);
        u32::try_from(attempts)
            .ok()
            .and_then(|n| self.timeout().checked_mul(n))
            .unwrap_or(Duration::MAX)
    }

    pub fn configured_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.iter().filter(|p| p.key().is_some())
    }

    pub fn provider_mut(&mut self, kind: ProviderKind) -> &mut ProviderConfig {
        if let Some(index) = self.providers.iter().position(|p| p.kind == kind) {
            &mut self.providers[index]
        } else {
            self.providers.push(ProviderConfig::new(kind));
            let last = self.providers.len() - 1;
            &mut self.providers[last]
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: None,
            providers: default_providers(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u16 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(ProviderKind::Gemini),
        ProviderConfig::new(ProviderKind::Groq),
        ProviderConfig::new(ProviderKind::OpenAi),
    ]
}
