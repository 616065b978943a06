//! Shared application state.

use std::fmt;
use std::sync::Arc;

use trove_auth::{AssertionVerifier, AuthResult, TelegramInitDataVerifier, TokenService};
use trove_config::AuthSettings;

use crate::store::{
    CollectionStore, ComparisonStore, MemoryCollectionStore, MemoryComparisonStore,
    MemoryUserStore, UserStore,
};

/// Everything the handlers need, cloned into each route as an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// User records.
    pub users: Arc<dyn UserStore>,
    /// Collection records.
    pub collections: Arc<dyn CollectionStore>,
    /// Comparison records and their public links.
    pub comparisons: Arc<dyn ComparisonStore>,
    /// Issues and verifies session tokens.
    pub tokens: Arc<TokenService>,
    /// Verifies login assertions.
    pub assertions: Arc<dyn AssertionVerifier>,
}

impl AppState {
    /// Assembles state from explicit parts.
    pub fn new(
        users: Arc<dyn UserStore>,
        collections: Arc<dyn CollectionStore>,
        comparisons: Arc<dyn ComparisonStore>,
        tokens: Arc<TokenService>,
        assertions: Arc<dyn AssertionVerifier>,
    ) -> Self {
        Self {
            users,
            collections,
            comparisons,
            tokens,
            assertions,
        }
    }

    /// Builds state with in-memory stores and verifiers from `auth`.
    ///
    /// # Errors
    ///
    /// Fails if the login verifier cannot derive its key.
    pub fn from_settings(auth: &AuthSettings) -> AuthResult<Self> {
        let assertions =
            TelegramInitDataVerifier::new(&auth.telegram_bot_token, auth.max_auth_age())?;
        Ok(Self::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryCollectionStore::new()),
            Arc::new(MemoryComparisonStore::new()),
            Arc::new(TokenService::new(auth.jwt_secret.as_bytes(), auth.token_ttl())),
            Arc::new(assertions),
        ))
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
