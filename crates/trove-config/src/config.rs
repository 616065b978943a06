//! Root configuration type.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::{AuthSettings, ConfigError, Environment, LoggingSettings, ServerSettings};

/// Complete Trove backend configuration.
///
/// Built once at startup (usually through [`ConfigLoader`](crate::ConfigLoader))
/// and handed to the components that need it.
///
/// # Example
///
/// ```
/// use trove_config::TroveConfig;
///
/// let config = TroveConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TroveConfig {
    /// Deployment environment.
    #[serde(default)]
    pub environment: Environment,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Token and identity-assertion settings.
    #[serde(default)]
    pub auth: AuthSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl TroveConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> TroveConfigBuilder {
        TroveConfigBuilder::default()
    }

    /// Development preset: pretty `debug` logs.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.environment = Environment::Development;
        config.logging.level = "debug".to_string();
        config.logging.json_format = false;
        config
    }

    /// Production preset: JSON `info` logs and strict secret checks.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.environment = Environment::Production;
        config.logging.level = "info".to_string();
        config.logging.json_format = true;
        config
    }

    /// Whether this is a production configuration.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `server.http_addr` is not a
    /// socket address.
    pub fn http_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.http_addr.parse().map_err(|_| {
            ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            )
        })
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Fails if:
    /// - `server.http_addr` is not a socket address
    /// - `server.max_body_size` or `auth.token_ttl_secs` is zero
    /// - `auth.jwt_secret` is empty
    /// - in production, the secret is the placeholder or the bot token is unset
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.http_addr()?;

        if self.server.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_size",
                "must be greater than zero",
            ));
        }

        if self.auth.token_ttl_secs == 0 {
            return Err(ConfigError::invalid_value(
                "auth.token_ttl_secs",
                "must be greater than zero",
            ));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::invalid_value(
                "auth.jwt_secret",
                "must not be empty",
            ));
        }

        if self.is_production() {
            if self.auth.uses_default_secret() {
                return Err(ConfigError::validation_error(
                    "auth.jwt_secret must be set in production",
                ));
            }
            if self.auth.telegram_bot_token.is_empty() {
                return Err(ConfigError::validation_error(
                    "auth.telegram_bot_token must be set in production",
                ));
            }
        }

        Ok(())
    }
}

/// Builder for [`TroveConfig`].
#[derive(Debug, Default)]
pub struct TroveConfigBuilder {
    environment: Option<Environment>,
    server: Option<ServerSettings>,
    auth: Option<AuthSettings>,
    logging: Option<LoggingSettings>,
}

impl TroveConfigBuilder {
    /// Set the environment.
    #[must_use]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Set the server section.
    #[must_use]
    pub fn server(mut self, server: ServerSettings) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the auth section.
    #[must_use]
    pub fn auth(mut self, auth: AuthSettings) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingSettings) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration; unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> TroveConfig {
        TroveConfig {
            environment: self.environment.unwrap_or_default(),
            server: self.server.unwrap_or_default(),
            auth: self.auth.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<TroveConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production_auth() -> AuthSettings {
        AuthSettings {
            jwt_secret: "a-real-secret".to_string(),
            telegram_bot_token: "123456:ABC".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = TroveConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = TroveConfig::development();
        assert_eq!(dev.logging.level, "debug");
        assert!(!dev.logging.json_format);

        let prod = TroveConfig::production();
        assert!(prod.is_production());
        assert!(prod.logging.json_format);
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let err = TroveConfig::production().validate().unwrap_err();
        assert!(err.to_string().contains("auth.jwt_secret"));
    }

    #[test]
    fn test_production_requires_bot_token() {
        let config = TroveConfig::builder()
            .environment(Environment::Production)
            .auth(AuthSettings {
                jwt_secret: "s3cret".to_string(),
                ..Default::default()
            })
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn test_production_with_secrets_is_valid() {
        let config = TroveConfig::builder()
            .environment(Environment::Production)
            .auth(production_auth())
            .build_validated()
            .unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_addr() {
        let config = TroveConfig::builder()
            .server(ServerSettings {
                http_addr: "localhost".to_string(),
                ..Default::default()
            })
            .build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "server.http_addr"
        ));
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = TroveConfig::default();
        config.server.max_body_size = 0;
        assert!(config.validate().is_err());

        let mut config = TroveConfig::default();
        config.auth.token_ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = TroveConfig::default();
        config.auth.jwt_secret.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_http_addr_parses() {
        let addr = TroveConfig::default().http_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }
}
