//! Trove API server.
//!
//! Configuration is layered: built-in defaults, an optional `trove.toml`,
//! a `.env` file, then `TROVE__SECTION__KEY` environment variables.

use std::sync::Arc;

use anyhow::Context;
use trove::{build_router, AppState};
use trove_config::ConfigLoader;
use trove_middleware::AllowedOrigins;
use trove_server::{Server, ServerConfig};
use trove_telemetry::{init_logging, LogConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_defaults()
        .with_optional_file("trove.toml")?
        .with_dotenv()?
        .with_env_prefix("TROVE")
        .load()
        .context("failed to load configuration")?;

    let log_config = LogConfig::production()
        .with_level(config.logging.level.clone())
        .with_json(config.logging.json_format);
    init_logging(&log_config).context("failed to initialize logging")?;

    if config.auth.uses_default_secret() {
        tracing::warn!("JWT secret is the built-in default; set TROVE__AUTH__JWT_SECRET");
    }
    if config.auth.telegram_bot_token.is_empty() {
        tracing::warn!("Telegram bot token is empty; every login will be rejected");
    }

    let state = Arc::new(
        AppState::from_settings(&config.auth).context("failed to set up login verification")?,
    );
    let origins = AllowedOrigins::from_config(&config.server.cors_allowed_origins);
    let router = build_router(&state, origins).context("failed to register routes")?;

    let server_config = ServerConfig::builder()
        .http_addr(config.server.http_addr.clone())
        .shutdown_timeout(config.server.shutdown_timeout())
        .request_timeout(config.server.request_timeout())
        .max_body_size(config.server.max_body_size)
        .build();

    tracing::info!(
        environment = config.environment.as_str(),
        addr = %config.server.http_addr,
        "starting trove"
    );
    Server::new(server_config, Arc::new(router)).run().await?;
    Ok(())
}
