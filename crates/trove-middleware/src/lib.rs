//! # Trove Middleware
//!
//! Middleware composition for Trove handlers.
//!
//! A [`Middleware`] wraps a handler: it sees the request on the way in and
//! the response on the way out, and may short-circuit with its own
//! response. A [`Pipeline`] is an ordered list of middlewares folded around
//! a handler when a route is registered; the first middleware in the list
//! is outermost.
//!
//! ```text
//! Request → Logging → ErrorObserver → AuthGuard → Handler
//!                                                    ↓
//! Response ← Logging ← ErrorObserver ← AuthGuard ←───┘
//! ```
//!
//! ## Stages
//!
//! | Stage | Purpose |
//! |-------|---------|
//! | [`CorsMiddleware`] | Answers preflights and tags cross-origin responses |
//! | [`LoggingMiddleware`] | Start and completion markers with elapsed time |
//! | [`ErrorObserverMiddleware`] | Logs responses with status ≥ 400 |
//! | [`AuthGuard`] | Verifies the bearer token and records the identity |
//! | [`RequireAdmin`] | Rejects non-admin identities with 403 |
//!
//! Handlers that need the caller identity are built with [`authenticated`],
//! which hands them an [`Identity`](trove_core::Identity) instead of an `Option`.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use trove_auth::TokenService;
//! use trove_core::{response, RequestContext, Request};
//! use trove_middleware::{AuthGuard, LoggingMiddleware, Pipeline};
//!
//! let tokens = Arc::new(TokenService::new(b"secret", Duration::from_secs(60)));
//! let pipeline = Pipeline::new()
//!     .with(LoggingMiddleware::new())
//!     .with(AuthGuard::new(tokens));
//! assert_eq!(pipeline.names(), vec!["logging", "auth_guard"]);
//!
//! let handler = pipeline.wrap(trove_core::handler_fn(
//!     |_ctx: RequestContext, _req: Request| async { response::no_content() },
//! ));
//! # let _ = handler;
//! ```

#![doc(html_root_url = "https://docs.rs/trove-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod authenticated;
pub mod middleware;
pub mod pipeline;
pub mod stages;

pub use authenticated::{authenticated, Authenticated};
pub use middleware::{BoxedMiddleware, Middleware, Next};
pub use pipeline::Pipeline;
pub use stages::{
    AllowedOrigins, AuthGuard, AuthRejection, CorsMiddleware, ErrorObserverMiddleware,
    LoggingMiddleware, RequireAdmin,
};
