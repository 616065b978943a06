//! Handlers that require a verified identity.
//!
//! [`authenticated`] adapts a function taking an [`Identity`] into a
//! [`Handler`]. The function never sees an `Option`: if the handler is
//! mounted without an [`AuthGuard`](crate::AuthGuard) in front of it, the
//! adapter answers 401 instead of calling it.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use http::StatusCode;
use trove_core::{
    response, BoxFuture, BoxedHandler, Handler, Identity, IntoResponse, Request, RequestContext,
    Response,
};

/// Handler adapter produced by [`authenticated`].
pub struct Authenticated<F, Fut> {
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> Handler for Authenticated<F, Fut>
where
    F: Fn(Identity, RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'_, Response> {
        let Some(identity) = ctx.identity().cloned() else {
            tracing::error!(
                path = %request.uri().path(),
                "authenticated handler reached without an auth guard"
            );
            return Box::pin(async {
                response::error(StatusCode::UNAUTHORIZED, "Authorization header is required")
            });
        };
        let fut = (self.func)(identity, ctx, request);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Wraps a function that needs the caller identity as a [`BoxedHandler`].
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use trove_core::{response, Identity, Request, RequestContext};
/// use trove_middleware::authenticated;
///
/// let profile = authenticated(|me: Identity, _ctx: RequestContext, _req: Request| async move {
///     response::json(StatusCode::OK, &me)
/// });
/// # let _ = profile;
/// ```
pub fn authenticated<F, Fut>(func: F) -> BoxedHandler
where
    F: Fn(Identity, RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    Arc::new(Authenticated {
        func,
        _phantom: PhantomData,
    })
}
