//! Method-keyed route table with first-match lookup.

use std::collections::HashMap;

use http::Method;
use parking_lot::RwLock;

use crate::{compile, Params, PatternError, RoutePattern};

/// A successful lookup: the registered handler and the captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<H> {
    /// Handler registered for the matching route.
    pub handler: H,
    /// Parameters captured from the path, in template order.
    pub params: Params,
}

#[derive(Debug)]
struct RouteEntry<H> {
    pattern: RoutePattern,
    handler: H,
}

/// Registry of routes keyed by HTTP method.
///
/// Entries per method are append-only and tried in registration order;
/// the first pattern that matches wins. Registering the same template
/// twice keeps both entries; no deduplication happens.
///
/// The table can be shared behind an `Arc`: lookups take a read lock and
/// run concurrently, registration takes the write lock so a lookup never
/// observes a half-built method bucket.
#[derive(Debug)]
pub struct RouteTable<H> {
    routes: RwLock<HashMap<Method, Vec<RouteEntry<H>>>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
        }
    }
}

impl<H> RouteTable<H> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `template` and appends a route for `method`.
    ///
    /// The template is compiled before the write lock is taken.
    pub fn register(&self, method: Method, template: &str, handler: H) -> Result<(), PatternError> {
        let pattern = compile(template)?;
        self.insert(method, pattern, handler);
        Ok(())
    }

    /// Appends a route with an already compiled pattern.
    pub fn insert(&self, method: Method, pattern: RoutePattern, handler: H) {
        self.routes
            .write()
            .entry(method)
            .or_default()
            .push(RouteEntry { pattern, handler });
    }

    /// Returns the total number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.read().values().map(Vec::len).sum()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lists `(method, template)` pairs, grouped by method in registration order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let routes = self.routes.read();
        let mut out: Vec<_> = routes
            .iter()
            .flat_map(|(method, entries)| {
                entries
                    .iter()
                    .map(move |e| (method.clone(), e.pattern.template().to_string()))
            })
            .collect();
        out.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        out
    }
}

impl<H: Clone> RouteTable<H> {
    /// Resolves `method` and `path` to a handler.
    ///
    /// Returns `None` when the method has no routes or no pattern matches.
    #[must_use]
    pub fn dispatch(&self, method: &Method, path: &str) -> Option<RouteMatch<H>> {
        let routes = self.routes.read();
        routes.get(method)?.iter().find_map(|entry| {
            entry.pattern.match_path(path).map(|params| RouteMatch {
                handler: entry.handler.clone(),
                params,
            })
        })
    }
}
