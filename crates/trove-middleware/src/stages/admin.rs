//! Admin privilege check.
//!
//! Must sit after [`AuthGuard`](super::AuthGuard) in the chain; without a
//! recorded identity it rejects with 401.

use http::StatusCode;
use trove_core::{response, BoxFuture, Request, RequestContext, Response};

use crate::middleware::{Middleware, Next};

/// Lets only admin identities through; others get 403.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireAdmin;

impl RequireAdmin {
    /// Creates the admin check.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for RequireAdmin {
    fn name(&self) -> &'static str {
        "require_admin"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            match ctx.identity() {
                None => response::error(
                    StatusCode::UNAUTHORIZED,
                    "Admin privileges not found in context",
                ),
                Some(identity) if !identity.is_admin() => {
                    tracing::info!(
                        caller = %identity.log_id(),
                        role = %identity.role,
                        path = %request.uri().path(),
                        "admin route refused"
                    );
                    response::error(StatusCode::FORBIDDEN, "Admin privileges required")
                }
                Some(_) => next.run(ctx, request).await,
            }
        })
    }
}
