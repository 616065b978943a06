//! Verified caller identity.
//!
//! An [`Identity`] is only ever built from verified token claims. The auth
//! guard places it in the [`RequestContext`](crate::RequestContext); nothing
//! else writes it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller role.
///
/// The integer encoding is stable and is what bearer tokens carry.
/// Unknown codes decode to [`Role::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user.
    #[default]
    User,
    /// Curator with elevated content rights.
    Architect,
    /// Administrator.
    Admin,
}

impl Role {
    /// Returns the stable integer encoding.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::User => 0,
            Self::Architect => 1,
            Self::Admin => 2,
        }
    }

    /// Decodes a role, falling back to [`Role::User`] for unknown codes.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Architect,
            2 => Self::Admin,
            _ => Self::User,
        }
    }

    /// Returns the lowercase role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Architect => "architect",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity decoded from a verified bearer token.
///
/// Admin status is derived from [`Role`]; there is no separate flag to
/// disagree with it.
///
/// # Example
///
/// ```
/// use trove_core::{Identity, Role};
///
/// let identity = Identity::new(42, 7_000_001, "Ada", Role::Admin);
/// assert!(identity.is_admin());
/// assert_eq!(identity.role.as_str(), "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Internal numeric user id.
    pub user_id: i64,
    /// Id assigned by the external identity provider (Telegram).
    pub external_id: i64,
    /// Display name shown to other users.
    pub display_name: String,
    /// Caller role.
    pub role: Role,
}

impl Identity {
    /// Creates an identity.
    #[must_use]
    pub fn new(user_id: i64, external_id: i64, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            external_id,
            display_name: display_name.into(),
            role,
        }
    }

    /// Returns true if the caller is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns an identifier suitable for logs. Never contains credentials.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("user:{}", self.user_id)
    }
}
