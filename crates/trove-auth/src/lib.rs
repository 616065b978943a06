//! # Trove Auth
//!
//! Credential handling for Trove:
//!
//! - [`TokenService`] issues and verifies the HS256 bearer tokens the auth
//!   guard checks on every request. Verification is stateless; the only
//!   shared input is the read-only signing secret.
//! - [`TelegramInitDataVerifier`] checks the Telegram Web App `initData`
//!   assertion presented at login and yields the [`TelegramUser`] it vouches for.
//!
//! The auth guard depends only on the [`TokenVerifier`] trait, and the login
//! handler only on [`AssertionVerifier`], so either side can be swapped in tests.

#![doc(html_root_url = "https://docs.rs/trove-auth/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod telegram;
mod token;

pub use error::{AuthError, AuthResult};
pub use telegram::{AssertionVerifier, TelegramInitDataVerifier, TelegramUser};
pub use token::{Claims, TokenService, TokenVerifier};
