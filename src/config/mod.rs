mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, io::ErrorKind, path::Path, str::FromStr};
use tracing::debug;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Loads configuration from `CONFIG_PATH` (default `config.yaml`) and the
/// process environment. A missing file is not an error.
pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    let mut config = load_file(&config_path).await?;
    config.apply_overrides(|name| env::var(name).ok())?;
    config.validate()?;

    Ok(config)
}

pub async fn load_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    match tokio::fs::read_to_string(path).await {
        Ok(config_str) => Ok(serde_yaml::from_str(&config_str)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No configuration file at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

impl Config {
    /// Applies environment-style overrides. `lookup` returns the value of a
    /// variable, or `None` when it is unset.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.server.logs.level = level;
        }
        if let Some(timeout) = lookup("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_var("LLM_TIMEOUT_SECS", &timeout)?;
        }

        for kind in [ProviderKind::Gemini, ProviderKind::Groq, ProviderKind::OpenAi] {
            let prefix = kind.env_prefix();
            let api_key = lookup(&format!("{prefix}_API_KEY"));
            let model = lookup(&format!("{prefix}_MODEL"));
            let base_url = lookup(&format!("{prefix}_BASE_URL"));

            if api_key.is_none() && model.is_none() && base_url.is_none() {
                continue;
            }

            let provider = self.llm.provider_mut(kind);
            if let Some(api_key) = api_key {
                provider.api_key = Some(api_key);
            }
            if let Some(model) = model {
                provider.model = model;
            }
            if let Some(base_url) = base_url {
                provider.base_url = Some(base_url);
            }
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("server.port must be non-zero"));
        }

        if !is_valid_log_filter(&self.server.logs.level) {
            return Err(Error::config(format!(
                "Invalid log level: '{}'. Use error, warn, info, debug, trace \
                 or directives such as 'info,tower_http=debug'",
                self.server.logs.level
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(Error::config("llm.timeout_secs must be greater than zero"));
        }
        if self.llm.max_tokens == 0 {
            return Err(Error::config("llm.max_tokens must be greater than zero"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::config(format!(
                "llm.temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }
        if let Some(provider) = self.llm.providers.iter().find(|p| p.model.trim().is_empty()) {
            return Err(Error::config(format!(
                "provider '{}' has an empty model name",
                provider.kind
            )));
        }

        Ok(())
    }
}

/// Accepts a bare level or `RUST_LOG` style directives. Every directive
/// without a target must itself be a level, so a typo like `loud` is caught.
pub fn is_valid_log_filter(filter: &str) -> bool {
    let levels_ok = filter
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .all(|directive| directive.contains('=') || directive.parse::<LevelFilter>().is_ok());

    levels_ok && !filter.trim().is_empty() && EnvFilter::try_new(filter).is_ok()
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{name} has an invalid value: '{value}'")))
}
