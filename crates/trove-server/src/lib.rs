//! # Trove Server
//!
//! HTTP transport and request dispatch for the Trove backend.
//!
//! - [`Router`]: route registration with a global middleware chain, and
//!   dispatch of requests to composed handlers
//! - [`Server`]: hyper HTTP/1.1 accept loop with bounded body collection
//!   and graceful shutdown
//! - [`ShutdownSignal`] / [`ConnectionTracker`]: shutdown coordination
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use http::{Method, StatusCode};
//! use trove_core::{handler_fn, response};
//! use trove_middleware::{ErrorObserverMiddleware, LoggingMiddleware};
//! use trove_server::{Router, Server, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Arc::new(Router::new());
//! router.use_middleware(LoggingMiddleware::new());
//! router.use_middleware(ErrorObserverMiddleware::new());
//! router.handle_func(
//!     Method::GET,
//!     "/ping",
//!     handler_fn(|_ctx, _req| async { response::text(StatusCode::OK, "pong") }),
//! )?;
//!
//! Server::new(ServerConfig::default(), router).run().await?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/trove-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod router;
pub mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use router::Router;
pub use server::{Server, ServerError};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownReceiver, ShutdownSignal};
