//! Authentication error types.

use thiserror::Error;

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors from token and assertion handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A bearer token failed verification.
    ///
    /// The reason is shown to the client after `"Invalid token: "`.
    #[error("{reason}")]
    InvalidToken {
        /// Why verification failed.
        reason: String,
    },

    /// A token could not be signed.
    #[error("failed to issue token: {message}")]
    TokenIssue {
        /// Underlying encoder message.
        message: String,
    },

    /// An HMAC key could not be constructed.
    #[error("invalid signing key: {message}")]
    SigningKey {
        /// Underlying MAC error.
        message: String,
    },

    /// The identity assertion is malformed or its signature is wrong.
    #[error("invalid init data: {reason}")]
    InvalidAssertion {
        /// What was wrong with it.
        reason: String,
    },

    /// The identity assertion is older than the accepted window.
    #[error("init data expired: signed {age_secs}s ago, limit {max_age_secs}s")]
    StaleAssertion {
        /// Age of the assertion in seconds.
        age_secs: i64,
        /// Maximum accepted age in seconds.
        max_age_secs: i64,
    },
}

impl AuthError {
    /// Creates an invalid token error.
    #[must_use]
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Creates an invalid assertion error.
    #[must_use]
    pub fn invalid_assertion(reason: impl Into<String>) -> Self {
        Self::InvalidAssertion {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_token_display_is_bare_reason() {
        let err = AuthError::invalid_token("token is expired");
        assert_eq!(err.to_string(), "token is expired");
    }

    #[test]
    fn test_stale_assertion_display() {
        let err = AuthError::StaleAssertion {
            age_secs: 90_000,
            max_age_secs: 86_400,
        };
        assert!(err.to_string().contains("90000s"));
    }
}
