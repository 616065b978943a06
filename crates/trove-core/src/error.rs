//! Error types for Trove.
//!
//! [`TroveError`] is the error business handlers return. Each variant maps
//! onto an HTTP status through its [`ErrorCategory`], and converts into the
//! standard `{"message": ..., "code": ...}` error body with
//! [`TroveError::into_response`].

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::response;
use crate::Response;

/// Result type alias using [`TroveError`].
pub type TroveResult<T> = Result<T, TroveError>;

/// Categories of errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed request input.
    Validation,
    /// Missing or invalid credentials.
    Authentication,
    /// Authenticated but not allowed.
    Authorization,
    /// Resource not found.
    NotFound,
    /// Conflicting state (e.g. duplicate resource).
    Conflict,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the HTTP status code for this category.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Trove handlers.
///
/// # Example
///
/// ```
/// use trove_core::{TroveError, ErrorCategory};
///
/// fn parse_id(raw: &str) -> Result<i64, TroveError> {
///     raw.parse()
///         .map_err(|_| TroveError::validation("Collection ID is required"))
/// }
///
/// let err = parse_id("abc").unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// assert_eq!(err.message(), "Collection ID is required");
/// ```
#[derive(Error, Debug)]
pub enum TroveError {
    /// Request input is invalid.
    #[error("Validation error: {message}")]
    Validation {
        /// Client-facing message.
        message: String,
    },

    /// Credentials are missing or invalid.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Client-facing message.
        message: String,
    },

    /// The caller lacks a required privilege.
    #[error("Authorization denied: {message}")]
    Authorization {
        /// Client-facing message.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Client-facing message.
        message: String,
    },

    /// Conflicting state.
    #[error("Conflict: {message}")]
    Conflict {
        /// Client-facing message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Client-facing message.
        message: String,
        /// The underlying error (logged, never sent to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl TroveError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().status_code()
    }

    /// Returns the client-facing message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Authentication { message }
            | Self::Authorization { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Internal { message, .. } => message,
        }
    }

    /// Converts this error into a `{message, code}` JSON response.
    ///
    /// Internal errors with a source are logged here; the source never
    /// reaches the client.
    #[must_use]
    pub fn into_response(self) -> Response {
        if let Self::Internal {
            message,
            source: Some(source),
        } = &self
        {
            tracing::error!(error = %source, "{message}");
        }
        response::error(self.status_code(), self.message())
    }
}
