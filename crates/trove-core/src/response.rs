//! Response builders and body helpers.
//!
//! | Builder | Content-Type | Description |
//! |---------|--------------|-------------|
//! | [`json`] | `application/json` | Serialized value with a status |
//! | [`error`] | `application/json` | `{"message": ..., "code": ...}` error body |
//! | [`text`] | `text/plain` | Plain text |
//! | [`no_content`] | none | 204 No Content |
//! | [`not_found`] | `text/plain` | Generic 404 for unmatched routes |
//!
//! Every builder returns a complete [`Response`] value. A handler hands
//! back exactly one of them, so a status can never be written twice.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Request, Response, TroveError, TroveResult};

const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Conversion into a [`Response`].
///
/// Lets handlers return either a response or a `TroveResult<Response>`
/// and use `?` on their fallible steps.
pub trait IntoResponse {
    /// Converts `self` into a response.
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for TroveError {
    fn into_response(self) -> Response {
        TroveError::into_response(self)
    }
}

impl<R: IntoResponse> IntoResponse for Result<R, TroveError> {
    fn into_response(self) -> Response {
        match self {
            Ok(ok) => ok.into_response(),
            Err(err) => TroveError::into_response(err),
        }
    }
}

fn build(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> Response {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

/// Builds a JSON response.
///
/// Falls back to a 500 error body if `value` fails to serialize.
pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => build(status, Some(APPLICATION_JSON), Bytes::from(body)),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize response body");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Builds the standard error response: `{"message": message, "code": status}`.
///
/// # Example
///
/// ```
/// use trove_core::response;
/// use http::StatusCode;
///
/// let response = response::error(StatusCode::UNAUTHORIZED, "Authorization header is required");
/// assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
/// assert_eq!(response.headers()["content-type"], "application/json");
/// ```
pub fn error(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({
        "message": message,
        "code": status.as_u16(),
    });
    build(status, Some(APPLICATION_JSON), Bytes::from(body.to_string()))
}

/// Builds a plain text response.
pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Response {
    build(status, Some(TEXT_PLAIN), body.into())
}

/// Builds an empty 204 response.
pub fn no_content() -> Response {
    build(StatusCode::NO_CONTENT, None, Bytes::new())
}

/// Builds the generic response for requests no route matches.
pub fn not_found() -> Response {
    text(StatusCode::NOT_FOUND, "404 page not found\n")
}

/// Collects a buffered body into bytes.
pub async fn body_bytes(body: Full<Bytes>) -> Bytes {
    match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}

/// Deserializes a JSON request body.
///
/// Any decoding failure becomes a 400 `"Invalid request body"`.
pub async fn parse_json<T: DeserializeOwned>(request: Request) -> TroveResult<T> {
    let bytes = body_bytes(request.into_body()).await;
    serde_json::from_slice(&bytes).map_err(|err| {
        tracing::debug!(error = %err, "rejecting request body");
        TroveError::validation("Invalid request body")
    })
}

/// Reads a response body as JSON. Mostly useful in tests.
pub async fn read_json(response: Response) -> serde_json::Result<serde_json::Value> {
    let bytes = body_bytes(response.into_body()).await;
    serde_json::from_slice(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = error(StatusCode::FORBIDDEN, "Admin privileges required");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()[CONTENT_TYPE], APPLICATION_JSON);

        let body = read_json(response).await.unwrap();
        assert_eq!(body["message"], "Admin privileges required");
        assert_eq!(body["code"], 403);
    }

    #[tokio::test]
    async fn test_json_response() {
        let response = json(StatusCode::CREATED, &serde_json::json!({"id": 1}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await.unwrap()["id"], 1);
    }

    #[test]
    fn test_no_content_has_no_type() {
        let response = no_content();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_not_found_is_plain_text() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], TEXT_PLAIN);
        let body = body_bytes(response.into_body()).await;
        assert_eq!(&body[..], b"404 page not found\n");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct CreateBody {
        name: String,
    }

    #[tokio::test]
    async fn test_parse_json_request() {
        let request = http::Request::builder()
            .body(Full::new(Bytes::from_static(br#"{"name":"Reading"}"#)))
            .unwrap();
        let parsed: CreateBody = parse_json(request).await.unwrap();
        assert_eq!(parsed.name, "Reading");
    }

    #[tokio::test]
    async fn test_parse_json_rejects_garbage() {
        let request = http::Request::builder()
            .body(Full::new(Bytes::from_static(b"not json")))
            .unwrap();
        let err = parse_json::<CreateBody>(request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Invalid request body");
    }

    #[test]
    fn test_result_into_response() {
        let ok: TroveResult<Response> = Ok(no_content());
        assert_eq!(ok.into_response().status(), StatusCode::NO_CONTENT);

        let err: TroveResult<Response> = Err(TroveError::conflict("exists"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
