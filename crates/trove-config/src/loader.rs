//! Layered configuration loading.
//!
//! Layers apply in order, later ones overriding earlier ones:
//! defaults, then a TOML or JSON file, then `.env`, then environment
//! variables.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, Environment, TroveConfig};

/// Unprefixed variable names accepted for the two secrets.
const BARE_SECRET_VARS: [(&str, &str); 2] = [
    ("JWT_SECRET", "AUTH__JWT_SECRET"),
    ("TELEGRAM_BOT_TOKEN", "AUTH__TELEGRAM_BOT_TOKEN"),
];

/// Configuration loader with layered approach.
///
/// # Example
///
/// ```no_run
/// use trove_config::ConfigLoader;
///
/// # fn main() -> Result<(), trove_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("trove.toml")?
///     .with_dotenv()?
///     .with_env_prefix("TROVE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: TroveConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader seeded with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: TroveConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = TroveConfig::default();
        self
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use trove_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = TroveConfig::development();
        self
    }

    /// Start from the production preset.
    ///
    /// Secrets still have to come from a later layer before
    /// [`load`](Self::load) will succeed.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = TroveConfig::production();
        self
    }

    /// Load a configuration file; the format follows the extension
    /// (`.toml` or `.json`).
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, malformed or contains
    /// unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format
    /// (`"toml"` or `"json"`).
    ///
    /// ```
    /// use trove_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nhttp_addr = \"127.0.0.1:3000\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on parse errors or an unsupported format.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Load a `.env` file from the working directory into the process
    /// environment, if one exists.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::Dotenv(e.to_string())),
        }
    }

    /// Enable environment overrides of the form `PREFIX__SECTION__KEY`,
    /// e.g. `TROVE__SERVER__HTTP_ADDR=127.0.0.1:9000`.
    ///
    /// The bare `JWT_SECRET` and `TELEGRAM_BOT_TOKEN` variables are also
    /// honored; the prefixed form wins when both are set.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Apply environment overrides, validate, and return the configuration.
    ///
    /// # Errors
    ///
    /// Fails if an environment value cannot be parsed or validation fails.
    pub fn load(mut self) -> Result<TroveConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_vars(&prefix, env::vars())?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> TroveConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<TroveConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    // Bare names go first so prefixed variables override them.
    fn apply_vars<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut prefixed = Vec::new();
        for (key, value) in vars {
            if let Some((_, path)) = BARE_SECRET_VARS.iter().find(|(bare, _)| *bare == key) {
                if !value.is_empty() {
                    self.apply_path(&key, path, &value)?;
                }
            } else if key.starts_with(prefix) {
                prefixed.push((key, value));
            }
        }

        for (key, value) in prefixed {
            self.apply_env_var(&key, &value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let path = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;
        self.apply_path(key, path, value)
    }

    fn apply_path(&mut self, key: &str, path: &str, value: &str) -> Result<(), ConfigError> {
        let parts: Vec<&str> = path.split("__").collect();

        match parts.as_slice() {
            ["ENVIRONMENT"] => {
                self.config.environment = match value.to_lowercase().as_str() {
                    "development" | "dev" => Environment::Development,
                    "production" | "prod" => Environment::Production,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'development' or 'production'",
                        ))
                    }
                };
            }

            ["SERVER", "HTTP_ADDR"] => {
                self.config.server.http_addr = value.to_string();
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = parse_int(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_SECS"] => {
                self.config.server.request_timeout_secs = parse_int(key, value)?;
            }
            ["SERVER", "MAX_BODY_SIZE"] => {
                self.config.server.max_body_size = parse_int(key, value)?;
            }
            ["SERVER", "CORS_ALLOWED_ORIGINS"] => {
                self.config.server.cors_allowed_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect();
            }

            ["AUTH", "JWT_SECRET"] => {
                self.config.auth.jwt_secret = value.to_string();
            }
            ["AUTH", "TOKEN_TTL_SECS"] => {
                self.config.auth.token_ttl_secs = parse_int(key, value)?;
            }
            ["AUTH", "TELEGRAM_BOT_TOKEN"] => {
                self.config.auth.telegram_bot_token = value.to_string();
            }
            ["AUTH", "MAX_AUTH_AGE_SECS"] => {
                self.config.auth.max_auth_age_secs = parse_int(key, value)?;
            }

            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "JSON_FORMAT"] => {
                self.config.logging.json_format = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Unrelated variables that happen to share the prefix.
            _ => {}
        }

        Ok(())
    }
}

fn parse_int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_loader_production_needs_secrets() {
        assert!(ConfigLoader::new().with_production().load().is_err());
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"server": {"http_addr": "127.0.0.1:3000"}, "logging": {"level": "warn"}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.server.shutdown_timeout_secs, 30);
    }

    #[test]
    fn test_loader_unsupported_format() {
        assert!(ConfigLoader::new().with_string("x", "yaml").is_err());
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            environment = "production"

            [server]
            http_addr = "127.0.0.1:9000"
            max_body_size = 2048

            [auth]
            jwt_secret = "from-file"
            telegram_bot_token = "42:XYZ"
            token_ttl_secs = 3600
            "#
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert!(config.is_production());
        assert_eq!(config.server.http_addr, "127.0.0.1:9000");
        assert_eq!(config.server.max_body_size, 2048);
        assert_eq!(config.auth.jwt_secret, "from-file");
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.auth.max_auth_age_secs, 86_400);
    }

    #[test]
    fn test_loader_rejects_unknown_fields() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 8080").unwrap();

        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn test_loader_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(ConfigLoader::new().with_file(file.path()).is_err());
    }

    #[test]
    fn test_loader_file_not_found() {
        let err = ConfigLoader::new()
            .with_file("/nonexistent/trove.toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_loader_optional_file_missing() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/trove.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, TroveConfig::default());
    }

    #[test]
    fn test_prefixed_overrides() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_vars(
                "TEST",
                vars(&[
                    ("TEST__SERVER__HTTP_ADDR", "192.168.1.1:9000"),
                    ("TEST__SERVER__SHUTDOWN_TIMEOUT_SECS", "5"),
                    (
                        "TEST__SERVER__CORS_ALLOWED_ORIGINS",
                        "https://web.telegram.org, https://trove.app",
                    ),
                    ("TEST__AUTH__TOKEN_TTL_SECS", "60"),
                    ("TEST__LOGGING__JSON_FORMAT", "off"),
                    ("TEST__ENVIRONMENT", "prod"),
                    ("TEST__SOMETHING_ELSE", "ignored"),
                    ("PATH", "/usr/bin"),
                ]),
            )
            .unwrap();

        let config = loader.load_unvalidated();
        assert_eq!(config.server.http_addr, "192.168.1.1:9000");
        assert_eq!(config.server.shutdown_timeout_secs, 5);
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["https://web.telegram.org", "https://trove.app"]
        );
        assert_eq!(config.auth.token_ttl_secs, 60);
        assert!(!config.logging.json_format);
        assert!(config.is_production());
    }

    #[test]
    fn test_bare_secret_names() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_vars(
                "TEST",
                vars(&[("JWT_SECRET", "bare"), ("TELEGRAM_BOT_TOKEN", "1:bot")]),
            )
            .unwrap();
        let config = loader.load_unvalidated();
        assert_eq!(config.auth.jwt_secret, "bare");
        assert_eq!(config.auth.telegram_bot_token, "1:bot");
    }

    #[test]
    fn test_prefixed_secret_wins_over_bare() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_vars(
                "TEST",
                vars(&[
                    ("TEST__AUTH__JWT_SECRET", "prefixed"),
                    ("JWT_SECRET", "bare"),
                ]),
            )
            .unwrap();
        assert_eq!(loader.load_unvalidated().auth.jwt_secret, "prefixed");
    }

    #[test]
    fn test_empty_bare_secret_is_ignored() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_vars("TEST", vars(&[("JWT_SECRET", "")]))
            .unwrap();
        assert!(loader.load_unvalidated().auth.uses_default_secret());
    }

    #[test]
    fn test_invalid_integer() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_vars("TEST", vars(&[("TEST__SERVER__MAX_BODY_SIZE", "big")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_invalid_environment() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_vars("TEST", vars(&[("TEST__ENVIRONMENT", "staging")]))
            .is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
