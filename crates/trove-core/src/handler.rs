//! Handler trait for request processing.
//!
//! A [`Handler`] takes ownership of the request context and request and
//! produces exactly one response. Middleware-wrapped handlers implement the
//! same trait, so a composed chain is itself just a [`BoxedHandler`].

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{BoxFuture, IntoResponse, Request, RequestContext, Response};

/// A type-erased async request handler.
///
/// # Example
///
/// ```
/// use trove_core::{handler_fn, response, Handler, Request, RequestContext};
/// use http::StatusCode;
///
/// let handler = handler_fn(|ctx: RequestContext, _req: Request| async move {
///     let id = ctx.param("id").unwrap_or_default().to_string();
///     response::json(StatusCode::OK, &serde_json::json!({ "id": id }))
/// });
/// # let _ = &handler as &dyn Handler;
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handles one request.
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'_, Response>;
}

/// A shared, type-erased handler as stored in the route table.
pub type BoxedHandler = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'_, Response> {
        (**self).call(ctx, request)
    }
}

/// A function-based handler wrapper.
///
/// The function may return anything implementing [`IntoResponse`],
/// including `TroveResult<Response>`.
pub struct FnHandler<F, Fut> {
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnHandler<F, Fut> {
    /// Creates a new function-based handler.
    #[must_use]
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut> Handler for FnHandler<F, Fut>
where
    F: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'_, Response> {
        let fut = (self.func)(ctx, request);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Wraps an async function as a [`BoxedHandler`].
pub fn handler_fn<F, Fut>(func: F) -> BoxedHandler
where
    F: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    Arc::new(FnHandler::new(func))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{response, Params, TroveError, TroveResult};
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fn_handler_returns_response() {
        let handler = handler_fn(|_ctx, _req| async { response::no_content() });
        let response = handler.call(RequestContext::default(), request()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_fn_handler_maps_errors() {
        let handler = handler_fn(|ctx: RequestContext, _req| async move {
            let id: i64 = ctx
                .param("id")
                .and_then(|raw| raw.parse().ok())
                .ok_or_else(|| TroveError::validation("Collection ID is required"))?;
            TroveResult::Ok(response::json(StatusCode::OK, &id))
        });

        let mut params = Params::new();
        params.push("id", "abc");
        let response = handler.call(RequestContext::new(params), request()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let mut params = Params::new();
        params.push("id", "5");
        let response = handler.call(RequestContext::new(params), request()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_handler_is_object_safe() {
        let handlers: Vec<BoxedHandler> = vec![
            handler_fn(|_ctx, _req| async { response::no_content() }),
            handler_fn(|_ctx, _req| async { response::not_found() }),
        ];
        let statuses: Vec<StatusCode> = handlers
            .iter()
            .map(|h| tokio_test::block_on(h.call(RequestContext::default(), request())).status())
            .collect();
        assert_eq!(statuses, vec![StatusCode::NO_CONTENT, StatusCode::NOT_FOUND]);
    }
}
