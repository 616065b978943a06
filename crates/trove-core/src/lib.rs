//! # Trove Core
//!
//! Core types shared by every Trove crate.
//!
//! - [`Request`] / [`Response`] - HTTP types with a fully buffered body
//! - [`RequestContext`] - Per-request state: request id, path parameters, identity
//! - [`Identity`] / [`Role`] - Verified caller identity placed by the auth guard
//! - [`Handler`] - Type-erased async request handler
//! - [`TroveError`] - Error type that maps onto the `{message, code}` error body

#![doc(html_root_url = "https://docs.rs/trove-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;
mod identity;
pub mod response;
mod types;

pub use context::{RequestContext, RequestId};
pub use error::{ErrorCategory, TroveError, TroveResult};
pub use handler::{handler_fn, BoxedHandler, FnHandler, Handler};
pub use identity::{Identity, Role};
pub use response::IntoResponse;
pub use types::{BoxFuture, Request, Response};

/// Path parameters captured by the router.
pub use trove_router::Params;
