//! Typed configuration for the Trove backend.
//!
//! [`TroveConfig`] holds every setting the service reads at startup. It is
//! built once by [`ConfigLoader`], validated, and then passed by reference
//! to the components that need it; there is no global instance.
//!
//! # Configuration File Format
//!
//! ```toml
//! environment = "production"
//!
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_secs = 30
//! max_body_size = 1048576
//!
//! [auth]
//! jwt_secret = "change-me"
//! token_ttl_secs = 604800
//! telegram_bot_token = "123456:ABC-DEF"
//! max_auth_age_secs = 86400
//!
//! [logging]
//! level = "info"
//! json_format = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! With [`ConfigLoader::with_env_prefix`]`("TROVE")`, any value can be
//! overridden as `TROVE__SECTION__KEY`:
//!
//! - `TROVE__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `TROVE__AUTH__TOKEN_TTL_SECS=3600`
//! - `TROVE__LOGGING__LEVEL=debug`
//!
//! `JWT_SECRET` and `TELEGRAM_BOT_TOKEN` are read without a prefix as well.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{TroveConfig, TroveConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{AuthSettings, Environment, LoggingSettings, ServerSettings, DEFAULT_JWT_SECRET};
