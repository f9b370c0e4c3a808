use anyhow::Result;
use solace_relay::{config, server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Builds the log filter from a bare level or directives like `info,tower_http=debug`
fn log_filter(level: &str) -> Result<EnvFilter> {
    if !config::is_valid_log_filter(level) {
        anyhow::bail!(
            "Invalid log level: '{}'. Use error, warn, info, debug, trace \
             or directives such as 'info,tower_http=debug'",
            level
        );
    }
    Ok(EnvFilter::try_new(level)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // A local .env is optional; hosted deployments set real environment variables
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Determine log level: environment variable overrides config
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());

    let filter = match log_filter(&log_level) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting solace relay with log level: {}", log_level);
    if dotenv_loaded {
        info!("Loaded environment from .env");
    }

    let providers: Vec<_> = config
        .llm
        .configured_providers()
        .map(|p| p.kind.as_str())
        .collect();
    if !providers.is_empty() {
        info!("LLM providers in priority order: {}", providers.join(", "));
    }

    server::run(config).await?;

    Ok(())
}
