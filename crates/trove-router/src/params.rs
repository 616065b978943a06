//! Path parameters captured by a route match.
//!
//! Names are shared with the compiled [`RoutePattern`](crate::RoutePattern)
//! as `Arc<str>`, so a match only allocates the captured values.

use std::str::FromStr;
use std::sync::Arc;

use smallvec::SmallVec;

/// Two captures stay inline; more spill to the heap.
type Captures = SmallVec<[Capture; 2]>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Capture {
    name: Arc<str>,
    value: String,
}

/// Parameters captured from a request path, in template order.
///
/// Values are raw path segments; no percent-decoding is applied.
///
/// # Example
///
/// ```rust
/// use trove_router::compile;
///
/// let params = compile("/collections/:id").unwrap().match_path("/collections/7").unwrap();
///
/// assert_eq!(params.get("id"), Some("7"));
/// assert_eq!(params.parse::<i64>("id"), Some(Ok(7)));
/// assert_eq!(params.get("item"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    captures: Captures,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn for_pattern(param_count: usize) -> Self {
        Self {
            captures: Captures::with_capacity(param_count),
        }
    }

    /// Records a captured value.
    ///
    /// The router fills this in; handlers and tests may build their own.
    pub fn push(&mut self, name: impl Into<Arc<str>>, value: impl Into<String>) {
        self.captures.push(Capture {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Returns the raw value captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|c| &*c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Parses the value captured for `name`; `None` if it was not captured.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<Result<T, T::Err>> {
        self.get(name).map(str::parse)
    }

    /// Number of captured parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.captures.iter().map(|c| (&*c.name, c.value.as_str()))
    }
}
