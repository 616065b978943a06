//! Error-observing middleware.
//!
//! Looks at the status of the response coming back up the chain and logs
//! it when it is a client or server error. The response is passed through
//! untouched.

use trove_core::{BoxFuture, Request, RequestContext, Response};

use crate::middleware::{Middleware, Next};

/// Logs `HTTP <status> <method> <path>` for responses with status ≥ 400.
///
/// Server errors log at `error`, client errors at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorObserverMiddleware;

impl ErrorObserverMiddleware {
    /// Creates the error observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for ErrorObserverMiddleware {
    fn name(&self) -> &'static str {
        "error_observer"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let method = request.method().clone();
            let path = request.uri().path().to_owned();
            let request_id = ctx.request_id();

            let response = next.run(ctx, request).await;
            let status = response.status();

            if status.is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    status = status.as_u16(),
                    method = %method,
                    path = %path,
                    "HTTP {} {} {}",
                    status.as_u16(),
                    method,
                    path
                );
            } else if status.is_client_error() {
                tracing::warn!(
                    request_id = %request_id,
                    status = status.as_u16(),
                    method = %method,
                    path = %path,
                    "HTTP {} {} {}",
                    status.as_u16(),
                    method,
                    path
                );
            }

            response
        })
    }
}
