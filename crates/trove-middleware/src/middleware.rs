//! Core middleware trait and types.
//!
//! # Example
//!
//! ```
//! use trove_core::{BoxFuture, Request, RequestContext, Response};
//! use trove_middleware::{Middleware, Next};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: RequestContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let started = std::time::Instant::now();
//!             let response = next.run(ctx, request).await;
//!             tracing::debug!(elapsed = ?started.elapsed(), "timed");
//!             response
//!         })
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use trove_core::{BoxFuture, Handler, Request, RequestContext, Response};

/// A shared, type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A transformation around a handler.
///
/// # Invariants
///
/// - Call `next.run()` at most once; not calling it short-circuits the chain
/// - Never hold shared mutable state across requests; per-call locals only
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs and debugging.
    fn name(&self) -> &'static str;

    /// Processes one request, usually by delegating to `next`.
    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// The rest of the chain below a middleware.
///
/// Consumed by [`Next::run`], so it can be invoked at most once.
pub struct Next<'a> {
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    /// Wraps the handler that runs after the current middleware.
    pub fn new(handler: &'a dyn Handler) -> Self {
        Self { handler }
    }

    /// Invokes the rest of the chain.
    pub async fn run(self, ctx: RequestContext, request: Request) -> Response {
        self.handler.call(ctx, request).await
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use trove_core::{handler_fn, response};

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    struct ShortCircuit;

    impl Middleware for ShortCircuit {
        fn name(&self) -> &'static str {
            "short_circuit"
        }

        fn process<'a>(
            &'a self,
            _ctx: RequestContext,
            _request: Request,
            _next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async { response::error(StatusCode::TOO_MANY_REQUESTS, "slow down") })
        }
    }

    #[tokio::test]
    async fn test_next_runs_handler() {
        let handler = handler_fn(|_ctx, _req| async { response::no_content() });
        let next = Next::new(handler.as_ref());

        let response = next.run(RequestContext::default(), request()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler() {
        let handler = handler_fn(|_ctx, _req| async { response::no_content() });
        let mw = ShortCircuit;

        let response = mw
            .process(RequestContext::default(), request(), Next::new(handler.as_ref()))
            .await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(mw.name(), "short_circuit");
    }
}
