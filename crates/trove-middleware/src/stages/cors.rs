//! Cross-origin access for the Web App front end.
//!
//! Preflight `OPTIONS` requests are answered here and never reach a
//! handler. Other requests run the chain and get
//! `Access-Control-Allow-Origin` added when the origin is allowed.

use std::collections::HashSet;

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use trove_core::{response, BoxFuture, Request, RequestContext, Response};

use crate::middleware::{Middleware, Next};

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const MAX_AGE_SECS: &str = "86400";

/// Which origins may call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Any origin; answered with `*`.
    Any,
    /// Exactly these origins; answered by echoing the origin.
    List(HashSet<String>),
}

impl AllowedOrigins {
    /// Builds the policy from configured origins. A `*` entry allows any.
    pub fn from_config<S: AsRef<str>>(origins: &[S]) -> Self {
        if origins.iter().any(|o| o.as_ref() == "*") {
            return Self::Any;
        }
        Self::List(origins.iter().map(|o| o.as_ref().to_string()).collect())
    }

    /// The `Access-Control-Allow-Origin` value for `origin`, if allowed.
    fn header_for(&self, origin: &str) -> Option<HeaderValue> {
        match self {
            Self::Any => Some(HeaderValue::from_static("*")),
            Self::List(origins) if origins.contains(origin) => HeaderValue::from_str(origin).ok(),
            Self::List(_) => None,
        }
    }
}

/// CORS stage. Register it first so preflights skip the rest of the chain.
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    origins: AllowedOrigins,
}

impl CorsMiddleware {
    /// Creates the stage for `origins`.
    #[must_use]
    pub const fn new(origins: AllowedOrigins) -> Self {
        Self { origins }
    }

    /// Allows every origin.
    #[must_use]
    pub const fn permissive() -> Self {
        Self::new(AllowedOrigins::Any)
    }

    fn allow_origin(&self, headers: &HeaderMap) -> Option<HeaderValue> {
        match headers.get(ORIGIN).and_then(|v| v.to_str().ok()) {
            Some(origin) => self.origins.header_for(origin),
            // Non-browser callers send no Origin; a wildcard policy still answers.
            None if self.origins == AllowedOrigins::Any => Some(HeaderValue::from_static("*")),
            None => None,
        }
    }

    fn preflight(&self, headers: &HeaderMap) -> Response {
        let Some(allow_origin) = self.allow_origin(headers) else {
            tracing::debug!(origin = ?headers.get(ORIGIN), "preflight from disallowed origin");
            return response::error(StatusCode::FORBIDDEN, "Origin not allowed");
        };
        let mut response = response::no_content();
        let out = response.headers_mut();
        out.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        out.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        out.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
        out.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
        out.append(VARY, HeaderValue::from_static("Origin"));
        response
    }
}

impl Middleware for CorsMiddleware {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let headers = request.headers();
            if request.method() == Method::OPTIONS
                && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
            {
                return self.preflight(headers);
            }

            let allow_origin = self.allow_origin(headers);
            let mut response = next.run(ctx, request).await;
            if let Some(value) = allow_origin {
                let out = response.headers_mut();
                out.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
                out.append(VARY, HeaderValue::from_static("Origin"));
            }
            response
        })
    }
}
