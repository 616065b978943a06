//! HS256 bearer tokens.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use trove_core::{Identity, Role};

use crate::{AuthError, AuthResult};

/// Verifies a bearer token and returns the identity it carries.
///
/// Implementations must be pure with respect to shared state: the auth
/// guard calls this concurrently from every request.
pub trait TokenVerifier: Send + Sync + 'static {
    /// Verifies `token` (without the `Bearer ` prefix).
    fn verify(&self, token: &str) -> AuthResult<Identity>;
}

/// Claims carried by a Trove bearer token.
///
/// `is_admin` is written from the role for clients that read it, and is
/// ignored when decoding: the role is the only authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Internal user id.
    pub user_id: i64,
    /// Telegram user id.
    pub telegram_id: i64,
    /// Display name.
    pub generated_name: String,
    /// Admin flag, derived from `role`.
    pub is_admin: bool,
    /// Role code (see [`Role::code`]).
    pub role: i32,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    fn new(identity: &Identity, issued_at: i64, ttl: Duration) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            user_id: identity.user_id,
            telegram_id: identity.external_id,
            generated_name: identity.display_name.clone(),
            is_admin: identity.is_admin(),
            role: identity.role.code(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
        }
    }

    fn into_identity(self) -> Identity {
        let identity = Identity::new(
            self.user_id,
            self.telegram_id,
            self.generated_name,
            Role::from_code(self.role),
        );
        if self.is_admin != identity.is_admin() {
            tracing::debug!(
                user_id = identity.user_id,
                role = %identity.role,
                "token is_admin claim disagrees with role; using role"
            );
        }
        identity
    }
}

/// Issues and verifies HS256 tokens with a shared secret.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use trove_auth::{TokenService, TokenVerifier};
/// use trove_core::{Identity, Role};
///
/// let tokens = TokenService::new(b"test-secret", Duration::from_secs(3600));
/// let token = tokens.issue(&Identity::new(42, 7, "Ada", Role::Admin)).unwrap();
///
/// let identity = tokens.verify(&token).unwrap();
/// assert_eq!(identity.user_id, 42);
/// assert_eq!(identity.role, Role::Admin);
/// ```
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Creates a token service signing with `secret`; tokens live for `ttl`.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Returns the token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `identity`, valid from now.
    pub fn issue(&self, identity: &Identity) -> AuthResult<String> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Issues a token as if signed at `issued_at` (seconds since the epoch).
    pub fn issue_at(&self, identity: &Identity, issued_at: i64) -> AuthResult<String> {
        let claims = Claims::new(identity, issued_at, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
            |error| AuthError::TokenIssue {
                message: error.to_string(),
            },
        )
    }

    /// Decodes and validates a token, returning its raw claims.
    pub fn decode(&self, token: &str) -> AuthResult<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|error| AuthError::invalid_token(describe(error.kind())))
    }
}

impl TokenVerifier for TokenService {
    fn verify(&self, token: &str) -> AuthResult<Identity> {
        self.decode(token).map(Claims::into_identity)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn describe(kind: &ErrorKind) -> String {
    match kind {
        ErrorKind::ExpiredSignature => "token is expired".to_string(),
        ErrorKind::InvalidSignature => "signature is invalid".to_string(),
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            "token is malformed".to_string()
        }
        ErrorKind::InvalidAlgorithm => "signing method is not allowed".to_string(),
        ErrorKind::MissingRequiredClaim(claim) => format!("missing required claim {claim}"),
        other => format!("{other:?}"),
    }
}
