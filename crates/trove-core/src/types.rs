//! HTTP request and response aliases used across the handler chain.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type seen by middleware and handlers.
///
/// The server buffers the body before dispatch, so handlers always get a
/// `Full<Bytes>`.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by middleware and handlers.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
