//! HTTP/1.1 server.
//!
//! One tokio task per connection. Each request body is collected up to
//! [`ServerConfig::max_body_size`] within [`ServerConfig::request_timeout`],
//! then handed to the [`Router`]. On shutdown the accept loop stops, open
//! connections finish their in-flight request and close, and the server
//! waits up to [`ServerConfig::shutdown_timeout`] for them.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http::StatusCode;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use trove_core::{response, Response};

use crate::config::ServerConfig;
use crate::router::Router;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address does not parse.
    #[error("invalid address '{addr}': {source}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding the listener failed.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// The Trove HTTP server.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use trove_server::{Router, Server, ServerConfig};
///
/// # async fn run() -> Result<(), trove_server::ServerError> {
/// let router = Arc::new(Router::new());
/// Server::new(ServerConfig::default(), router).run().await
/// # }
/// ```
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    router: Arc<Router>,
}

impl Server {
    /// Creates a server dispatching to `router`.
    #[must_use]
    pub fn new(config: ServerConfig, router: Arc<Router>) -> Self {
        Self { config, router }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Runs until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Fails if the address is invalid or cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Fails if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await;
        Ok(())
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// fires, then drains open connections.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) {
        match listener.local_addr() {
            Ok(addr) => tracing::info!(%addr, "server listening"),
            Err(e) => tracing::warn!(error = %e, "server listening on unknown address"),
        }

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = server.handle_connection(stream, shutdown).await {
                                tracing::debug!(%remote_addr, error = %e, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to accept connection");
                    }
                },

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let timeout = server.config.shutdown_timeout();
        tracing::info!(
            active = tracker.active_connections(),
            ?timeout,
            "waiting for connections to close"
        );

        if tokio::time::timeout(timeout, tracker.wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("server stopped");
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);
        let service = service_fn(move |req: http::Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(&self, req: http::Request<Incoming>) -> Response {
        let (parts, body) = req.into_parts();
        let limit = self.config.max_body_size();
        let timeout = self.config.request_timeout();

        let collected =
            tokio::time::timeout(timeout, Limited::new(body, limit).collect()).await;

        let bytes = match collected {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => {
                tracing::warn!(path = %parts.uri.path(), limit, "request body too large");
                return response::error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            }
            Ok(Err(e)) => {
                tracing::warn!(path = %parts.uri.path(), error = %e, "failed to read request body");
                return response::error(StatusCode::BAD_REQUEST, "Failed to read request body");
            }
            Err(_) => {
                tracing::warn!(path = %parts.uri.path(), "request body read timed out");
                return response::error(StatusCode::REQUEST_TIMEOUT, "Request body read timed out");
            }
        };

        let method = parts.method.clone();
        let path = parts.uri.path().to_owned();
        let request = http::Request::from_parts(parts, Full::new(bytes));

        match tokio::time::timeout(timeout, self.router.dispatch(request)).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(%method, %path, "handler timed out");
                response::error(StatusCode::GATEWAY_TIMEOUT, "Request timed out")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_invalid_address() {
        let config = ServerConfig::builder().http_addr("not-an-address").build();
        let server = Server::new(config, Arc::new(Router::new()));

        let err = server
            .run_with_shutdown(ShutdownSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress { .. }));
        assert!(err.to_string().contains("not-an-address"));
    }

    #[tokio::test]
    async fn test_run_and_shutdown() {
        let config = ServerConfig::builder()
            .http_addr("127.0.0.1:0")
            .shutdown_timeout(Duration::from_millis(100))
            .build();
        let server = Server::new(config, Arc::new(Router::new()));

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), server.run_with_shutdown(shutdown))
            .await
            .expect("server should stop");
        assert!(result.is_ok());
    }
}
