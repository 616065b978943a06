//! Configuration sections.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Placeholder signing secret used when none is configured.
///
/// Accepted in development so the service starts without setup; rejected
/// by [`TroveConfig::validate`](crate::TroveConfig::validate) in production.
pub const DEFAULT_JWT_SECRET: &str = "default_secret_key";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development; lenient validation.
    #[default]
    Development,
    /// Production; secrets must be configured.
    Production,
}

impl Environment {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// HTTP server section.
///
/// # Example
///
/// ```
/// use trove_config::ServerSettings;
///
/// let server = ServerSettings {
///     http_addr: "127.0.0.1:3000".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(server.shutdown_timeout_secs, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSettings {
    /// Bind address, e.g. `0.0.0.0:8080`.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Upper bound on reading a request body, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum accepted request body in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Origins allowed to call the API from a browser. `*` allows any.
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_secs: default_request_timeout(),
            max_body_size: default_max_body_size(),
            cors_allowed_origins: default_cors_origins(),
        }
    }
}

impl ServerSettings {
    /// Shutdown timeout as a [`Duration`].
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

const fn default_shutdown_timeout() -> u64 {
    30
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// Authentication section.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthSettings {
    /// HS256 signing secret for session tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Bot token used to verify Telegram `initData`.
    #[serde(default)]
    pub telegram_bot_token: String,

    /// Oldest accepted `auth_date`, in seconds.
    #[serde(default = "default_max_auth_age")]
    pub max_auth_age_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_secs: default_token_ttl(),
            telegram_bot_token: String::new(),
            max_auth_age_secs: default_max_auth_age(),
        }
    }
}

impl AuthSettings {
    /// Token lifetime as a [`Duration`].
    #[must_use]
    pub const fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Maximum `auth_date` age as a [`Duration`].
    #[must_use]
    pub const fn max_auth_age(&self) -> Duration {
        Duration::from_secs(self.max_auth_age_secs)
    }

    /// Whether the placeholder secret is still in use.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

// Secrets stay out of debug output.
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field(
                "telegram_bot_token",
                &if self.telegram_bot_token.is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .field("max_auth_age_secs", &self.max_auth_age_secs)
            .finish()
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

const fn default_token_ttl() -> u64 {
    7 * 24 * 60 * 60
}

const fn default_max_auth_age() -> u64 {
    24 * 60 * 60
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `trove=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of pretty output.
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}
