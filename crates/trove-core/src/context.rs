//! Per-request context.
//!
//! The [`RequestContext`] is created by the dispatcher for each request and
//! moved down the handler chain by value. It is never shared between
//! requests, so it needs no locking.

use http::Extensions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Identity, Params};

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log correlation ids sortable.
///
/// # Example
///
/// ```
/// use trove_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request state visible to middleware and handlers.
///
/// Seeded with the path parameters extracted by the router. The identity
/// is `None` until the auth guard has verified a bearer token; handlers
/// that need it should be wrapped so they receive the [`Identity`]
/// directly instead of reading this option.
///
/// # Example
///
/// ```
/// use trove_core::{Identity, Params, RequestContext, Role};
///
/// let mut params = Params::new();
/// params.push("id", "7");
///
/// let mut ctx = RequestContext::new(params);
/// assert_eq!(ctx.param("id"), Some("7"));
/// assert!(ctx.identity().is_none());
///
/// ctx.set_identity(Identity::new(42, 1, "Ada", Role::User));
/// assert_eq!(ctx.identity().map(|i| i.user_id), Some(42));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    params: Params,
    identity: Option<Identity>,
    extensions: Extensions,
}

impl RequestContext {
    /// Creates a context for a freshly dispatched request.
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self {
            request_id: RequestId::new(),
            params,
            identity: None,
            extensions: Extensions::new(),
        }
    }

    /// Returns the request id.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns all path parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns one path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Returns the verified identity, if the auth guard ran.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Records the verified identity.
    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Stores a value for later stages, replacing any value of the same type.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }

    /// Returns a value stored by an earlier stage.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Params::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_each_context_gets_its_own_id() {
        let a = RequestContext::default();
        let b = a.clone();
        let c = RequestContext::default();
        assert_eq!(a.request_id(), b.request_id());
        assert_ne!(a.request_id(), c.request_id());
    }

    #[test]
    fn test_identity_starts_empty() {
        let mut ctx = RequestContext::default();
        assert!(ctx.identity().is_none());

        ctx.set_identity(Identity::new(42, 99, "Ada", Role::Admin));
        let identity = ctx.identity().unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_extensions_survive_clone() {
        #[derive(Debug, Clone, PartialEq)]
        struct Loaded(Vec<i64>);

        let mut ctx = RequestContext::default();
        assert!(ctx.get::<Loaded>().is_none());
        assert!(ctx.insert(Loaded(vec![1])).is_none());
        assert_eq!(ctx.insert(Loaded(vec![1, 2])), Some(Loaded(vec![1])));

        let copy = ctx.clone();
        assert_eq!(copy.get::<Loaded>(), Some(&Loaded(vec![1, 2])));
    }

    #[test]
    fn test_params_are_kept() {
        let mut params = Params::new();
        params.push("x", "1");
        params.push("y", "two");

        let ctx = RequestContext::new(params);
        assert_eq!(ctx.params().len(), 2);
        assert_eq!(ctx.param("y"), Some("two"));
        assert_eq!(ctx.param("z"), None);
    }
}
