//! Request logging middleware.
//!
//! Emits a start marker before the rest of the chain runs and a completion
//! marker with the elapsed time after it returns. Never short-circuits.

use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use trove_core::{BoxFuture, Request, RequestContext, Response};

use crate::middleware::{Middleware, Next};

/// Logs `Started <method> <path>` and `Completed <method> <path> in <elapsed>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    /// Creates the logging middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
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
            let started = Instant::now();

            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                started_at = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                "Started {} {}",
                method,
                path
            );

            let response = next.run(ctx, request).await;
            let elapsed = started.elapsed();

            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = response.status().as_u16(),
                elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
                "Completed {} {} in {:?}",
                method,
                path,
                elapsed
            );

            response
        })
    }
}
