//! Logging setup for Trove services.
//!
//! Trove logs through [`tracing`]. This crate installs the global
//! subscriber once at startup: an [`EnvFilter`](tracing_subscriber::EnvFilter)
//! built from the configured level, and a fmt layer that writes either
//! JSON lines (production) or pretty, human-readable output (development).
//!
//! # Example
//!
//! ```no_run
//! use trove_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production()).expect("logging already initialized");
//! tracing::info!(user_id = 42, "profile served");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
