//! Built-in middleware stages.
//!
//! - [`cors`] - Preflight answers and allowed-origin headers
//! - [`logging`] - Start/completion markers
//! - [`error_observer`] - Logs error responses
//! - [`auth`] - Bearer token guard
//! - [`admin`] - Admin privilege check, layered after the guard

pub mod admin;
pub mod auth;
pub mod cors;
pub mod error_observer;
pub mod logging;

pub use admin::RequireAdmin;
pub use auth::{AuthGuard, AuthRejection};
pub use cors::{AllowedOrigins, CorsMiddleware};
pub use error_observer::ErrorObserverMiddleware;
pub use logging::LoggingMiddleware;
