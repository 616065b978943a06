//! Request dispatch.
//!
//! The [`Router`] owns the route table and the list of global middlewares.
//! Registering a route folds the middlewares registered *so far* around the
//! handler, so a middleware added later does not wrap routes that already
//! exist:
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use trove_core::{handler_fn, response};
//! use trove_middleware::LoggingMiddleware;
//! use trove_server::Router;
//!
//! let router = Router::new();
//! router.use_middleware(LoggingMiddleware::new());
//! router
//!     .handle_func(
//!         Method::GET,
//!         "/collections/:id",
//!         handler_fn(|ctx, _req| async move {
//!             response::text(StatusCode::OK, ctx.param("id").unwrap_or_default().to_owned())
//!         }),
//!     )
//!     .unwrap();
//!
//! assert_eq!(router.routes(), vec![(Method::GET, "/collections/:id".to_string())]);
//! ```
//!
//! Unmatched requests get a plain-text 404 and do not pass through any
//! middleware.

use std::fmt;
use std::sync::Arc;

use http::Method;
use parking_lot::RwLock;
use trove_core::{response, BoxedHandler, Request, RequestContext, Response};
use trove_middleware::{Middleware, Pipeline};
use trove_router::{PatternError, RouteMatch, RouteTable};

/// Method + path dispatcher with a global middleware chain.
///
/// All methods take `&self`; the router is meant to be shared behind an
/// `Arc` between the accept loop and every connection task.
#[derive(Default)]
pub struct Router {
    table: RouteTable<BoxedHandler>,
    middlewares: RwLock<Pipeline>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware that wraps every route registered from now on.
    pub fn use_middleware<M: Middleware>(&self, middleware: M) {
        let mut pipeline = self.middlewares.write();
        tracing::debug!(
            middleware = middleware.name(),
            position = pipeline.len(),
            "middleware registered"
        );
        pipeline.push(Arc::new(middleware));
    }

    /// Registers `handler` for `method` and `template`.
    ///
    /// The handler is wrapped with the middlewares registered before this
    /// call, first-registered outermost.
    ///
    /// # Errors
    ///
    /// Returns the [`PatternError`] for a malformed template; nothing is
    /// registered in that case.
    pub fn handle_func(
        &self,
        method: Method,
        template: &str,
        handler: BoxedHandler,
    ) -> Result<(), PatternError> {
        let composed = self.middlewares.read().wrap(handler);
        self.table.register(method.clone(), template, composed)?;
        tracing::debug!(method = %method, template, "route registered");
        Ok(())
    }

    /// Resolves `method` and `path` to the composed handler and its path
    /// parameters. The first matching registration wins.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch<BoxedHandler>> {
        self.table.dispatch(method, path)
    }

    /// Dispatches a request and returns the handler's response, or 404 when
    /// no route matches.
    pub async fn dispatch(&self, request: Request) -> Response {
        let Some(RouteMatch { handler, params }) =
            self.lookup(request.method(), request.uri().path())
        else {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                "no route matched"
            );
            return response::not_found();
        };

        handler.call(RequestContext::new(params), request).await
    }

    /// Registered routes as `(method, template)`, in registration order per method.
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.table.routes()
    }

    /// Names of the global middlewares, outermost first.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middlewares.read().names()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("middlewares", &self.middleware_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use parking_lot::Mutex;
    use trove_core::{handler_fn, BoxFuture};
    use trove_middleware::Next;

    fn get(path: &str) -> Request {
        http::Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn echo(label: &'static str) -> BoxedHandler {
        handler_fn(move |ctx: RequestContext, _req| {
            let params: Vec<String> = ctx
                .params()
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            async move { response::text(StatusCode::OK, format!("{label} {}", params.join(","))) }
        })
    }

    async fn body_text(response: Response) -> String {
        let bytes = response::body_bytes(response.into_body()).await;
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    struct Tag {
        name: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for Tag {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: RequestContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            self.seen.lock().push(self.name);
            Box::pin(next.run(ctx, request))
        }
    }

    #[tokio::test]
    async fn test_dispatch_with_params() {
        let router = Router::new();
        router
            .handle_func(Method::GET, "/a/:x/b/:y", echo("ab"))
            .unwrap();

        let response = router.dispatch(get("/a/1/b/two")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ab x=1,y=two");

        for path in ["/a/1/c/two", "/a//b/two"] {
            let response = router.dispatch(get(path)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_first_registration_wins() {
        let router = Router::new();
        router
            .handle_func(Method::GET, "/items/:id", echo("param"))
            .unwrap();
        router
            .handle_func(Method::GET, "/items/new", echo("literal"))
            .unwrap();

        let response = router.dispatch(get("/items/new")).await;
        assert_eq!(body_text(response).await, "param id=new");
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let router = Router::new();
        let response = router.dispatch(get("/nowhere")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "404 page not found\n");
    }

    #[test]
    fn test_method_mismatch_is_not_found() {
        let router = Router::new();
        router.handle_func(Method::POST, "/auth", echo("auth")).unwrap();
        let response = tokio_test::block_on(router.dispatch(get("/auth")));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bad_template_is_rejected() {
        let router = Router::new();
        let err = router
            .handle_func(Method::GET, "/a/:x/:x", echo("dup"))
            .unwrap_err();
        assert!(matches!(err, PatternError::DuplicateParam { .. }));
        assert!(router.routes().is_empty());
    }

    #[tokio::test]
    async fn test_use_middleware_is_not_retroactive() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new();
        router.use_middleware(Tag {
            name: "early",
            seen: Arc::clone(&seen),
        });
        router.handle_func(Method::GET, "/before", echo("b")).unwrap();
        router.use_middleware(Tag {
            name: "late",
            seen: Arc::clone(&seen),
        });
        router.handle_func(Method::GET, "/after", echo("a")).unwrap();

        router.dispatch(get("/before")).await;
        assert_eq!(*seen.lock(), vec!["early"]);

        seen.lock().clear();
        router.dispatch(get("/after")).await;
        assert_eq!(*seen.lock(), vec!["early", "late"]);

        assert_eq!(router.middleware_names(), vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_unmatched_request_skips_middleware() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new();
        router.use_middleware(Tag {
            name: "outer",
            seen: Arc::clone(&seen),
        });
        router.handle_func(Method::GET, "/x", echo("x")).unwrap();

        router.dispatch(get("/y")).await;
        assert!(seen.lock().is_empty());
    }
}
