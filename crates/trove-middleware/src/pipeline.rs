//! Ordered middleware composition.
//!
//! With middlewares `[m1, m2, m3]` and handler `h`, [`Pipeline::wrap`]
//! produces `m1(m2(m3(h)))`: `m1` sees the request first and the
//! response last. Wrapping is done once, at route registration; the
//! resulting handler is immutable.

use std::fmt;
use std::sync::Arc;

use trove_core::{BoxFuture, BoxedHandler, Handler, Request, RequestContext, Response};

use crate::middleware::{BoxedMiddleware, Middleware, Next};

/// An ordered list of middlewares.
///
/// Cloning is cheap: stages are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware, builder style.
    #[must_use]
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends a shared middleware.
    pub fn push(&mut self, middleware: BoxedMiddleware) {
        self.stages.push(middleware);
    }

    /// Returns middleware names, outermost first.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of middlewares.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the pipeline has no middlewares.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Folds the pipeline around `handler`, first middleware outermost.
    #[must_use]
    pub fn wrap(&self, handler: BoxedHandler) -> BoxedHandler {
        self.stages.iter().rev().fold(handler, |inner, middleware| {
            Arc::new(Wrapped {
                middleware: Arc::clone(middleware),
                inner,
            })
        })
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.names())
            .finish()
    }
}

/// One middleware bound to the handler it wraps.
struct Wrapped {
    middleware: BoxedMiddleware,
    inner: BoxedHandler,
}

impl Handler for Wrapped {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'_, Response> {
        self.middleware
            .process(ctx, request, Next::new(self.inner.as_ref()))
    }
}
