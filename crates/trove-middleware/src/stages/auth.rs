//! Bearer token guard.
//!
//! Each request goes through exactly one authentication attempt:
//!
//! | State | Condition | Outcome |
//! |-------|-----------|---------|
//! | NoHeader | `Authorization` absent or empty | 401 `Authorization header is required` |
//! | BadScheme | value does not start with `Bearer ` | 401 `Authorization header must start with Bearer` |
//! | InvalidToken | verifier rejects the token | 401 `Invalid token: <reason>` |
//! | Authenticated | verifier accepts the token | identity recorded, chain continues |
//!
//! On every rejection the guard answers itself and the wrapped handler
//! never runs.

use std::fmt;
use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::{HeaderMap, StatusCode};
use trove_auth::TokenVerifier;
use trove_core::{response, BoxFuture, BoxedHandler, Identity, Request, RequestContext, Response};

use crate::middleware::{Middleware, Next};
use crate::Pipeline;

/// Required prefix of the `Authorization` value.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Why the guard rejected a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization` header.
    MissingHeader,
    /// The header does not use the bearer scheme.
    BadScheme,
    /// The token failed verification.
    InvalidToken(String),
}

impl AuthRejection {
    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MissingHeader => "Authorization header is required".to_string(),
            Self::BadScheme => "Authorization header must start with Bearer".to_string(),
            Self::InvalidToken(reason) => format!("Invalid token: {reason}"),
        }
    }

    /// Builds the 401 response for this rejection.
    #[must_use]
    pub fn into_response(self) -> Response {
        response::error(StatusCode::UNAUTHORIZED, &self.message())
    }
}

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Middleware that verifies `Authorization: Bearer <token>` and records
/// the resulting [`Identity`] in the request context.
#[derive(Clone)]
pub struct AuthGuard {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthGuard {
    /// Creates a guard backed by `verifier`.
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Runs the authentication state machine against request headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthRejection> {
        let value = match headers.get(AUTHORIZATION) {
            None => return Err(AuthRejection::MissingHeader),
            Some(value) if value.is_empty() => return Err(AuthRejection::MissingHeader),
            Some(value) => value,
        };
        let token = value
            .as_bytes()
            .strip_prefix(BEARER_PREFIX.as_bytes())
            .ok_or(AuthRejection::BadScheme)?;
        let token = std::str::from_utf8(token)
            .map_err(|_| AuthRejection::InvalidToken("token is malformed".to_string()))?;

        self.verifier
            .verify(token)
            .map_err(|err| AuthRejection::InvalidToken(err.to_string()))
    }

    /// Wraps `handler` so it only runs for authenticated requests.
    #[must_use]
    pub fn protect(&self, handler: BoxedHandler) -> BoxedHandler {
        Pipeline::new().with(self.clone()).wrap(handler)
    }
}

impl fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGuard").finish_non_exhaustive()
    }
}

impl Middleware for AuthGuard {
    fn name(&self) -> &'static str {
        "auth_guard"
    }

    fn process<'a>(
        &'a self,
        mut ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            match self.authenticate(request.headers()) {
                Ok(identity) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        caller = %identity.log_id(),
                        role = %identity.role,
                        "authenticated"
                    );
                    ctx.set_identity(identity);
                    next.run(ctx, request).await
                }
                Err(rejection) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        reason = %rejection,
                        "rejected unauthenticated request"
                    );
                    rejection.into_response()
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use trove_auth::TokenService;
    use trove_core::{handler_fn, Role};

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(b"guard-secret", Duration::from_secs(600)))
    }

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/profile");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    fn counting_handler(calls: &Arc<AtomicUsize>) -> BoxedHandler {
        let calls = Arc::clone(calls);
        handler_fn(move |ctx: RequestContext, _req| {
            calls.fetch_add(1, Ordering::SeqCst);
            let identity = ctx.identity().cloned();
            async move {
                let identity = identity.expect("guard sets identity");
                response::json(
                    StatusCode::OK,
                    &serde_json::json!({
                        "user_id": identity.user_id,
                        "role": identity.role.as_str(),
                        "is_admin": identity.is_admin(),
                    }),
                )
            }
        })
    }

    async fn rejection_message(response: Response) -> String {
        let body = response::read_json(response).await.unwrap();
        body["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_missing_header() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = AuthGuard::new(tokens()).protect(counting_handler(&calls));

        let response = handler.call(RequestContext::default(), request(None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            rejection_message(response).await,
            "Authorization header is required"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_header_counts_as_missing() {
        let guard = AuthGuard::new(tokens());
        let req = request(Some(""));
        assert_eq!(
            guard.authenticate(req.headers()),
            Err(AuthRejection::MissingHeader)
        );
    }

    #[tokio::test]
    async fn test_bad_scheme() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = AuthGuard::new(tokens()).protect(counting_handler(&calls));

        for value in ["Basic dXNlcjpwYXNz", "bearer abc", "Bearer"] {
            let response = handler
                .call(RequestContext::default(), request(Some(value)))
                .await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                rejection_message(response).await,
                "Authorization header must start with Bearer"
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_non_utf8_after_bearer_is_invalid_token() {
        let guard = AuthGuard::new(tokens());
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            http::HeaderValue::from_bytes(b"Bearer \xe9tok").unwrap(),
        );
        assert_eq!(
            guard.authenticate(&headers),
            Err(AuthRejection::InvalidToken("token is malformed".to_string()))
        );

        headers.insert(
            AUTHORIZATION,
            http::HeaderValue::from_bytes(b"\xe9Bearer tok").unwrap(),
        );
        assert_eq!(guard.authenticate(&headers), Err(AuthRejection::BadScheme));
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = AuthGuard::new(tokens()).protect(counting_handler(&calls));

        let response = handler
            .call(RequestContext::default(), request(Some("Bearer garbage")))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            rejection_message(response).await,
            "Invalid token: token is malformed"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_propagates_identity() {
        let tokens = tokens();
        let token = tokens
            .issue(&Identity::new(42, 4242, "Ada", Role::Admin))
            .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = AuthGuard::new(tokens).protect(counting_handler(&calls));

        let response = handler
            .call(
                RequestContext::default(),
                request(Some(&format!("Bearer {token}"))),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response::read_json(response).await.unwrap();
        assert_eq!(body["user_id"], 42);
        assert_eq!(body["role"], "admin");
        assert_eq!(body["is_admin"], true);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            AuthRejection::InvalidToken("token is expired".into()).to_string(),
            "Invalid token: token is expired"
        );
    }
}
