//! Route template compilation and matching.
//!
//! A template is a `/`-delimited path. Any segment starting with
//! [`PARAM_SENTINEL`] is a named parameter capturing exactly one
//! non-empty path segment; every other segment must match literally.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::Params;

/// Leading character marking a parameter segment (`/users/:id`).
pub const PARAM_SENTINEL: char = ':';

/// Errors raised while compiling a route template.
///
/// These are configuration errors: they surface at route registration,
/// before the server accepts traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The template does not start with `/`.
    #[error("route template `{template}` must start with '/'")]
    MissingLeadingSlash {
        /// The offending template.
        template: String,
    },

    /// A parameter segment has no name (`/users/:`).
    #[error("route template `{template}` has a parameter without a name")]
    EmptyParamName {
        /// The offending template.
        template: String,
    },

    /// The same parameter name appears twice.
    #[error("route template `{template}` declares parameter `{name}` more than once")]
    DuplicateParam {
        /// The offending template.
        template: String,
        /// The repeated parameter name.
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(Arc<str>),
}

/// A compiled route template.
///
/// Immutable once built. Matching is anchored and segment-wise: a
/// parameter never spans a `/` and never matches an empty segment.
///
/// # Example
///
/// ```rust
/// use trove_router::compile;
///
/// let pattern = compile("/a/:x/b/:y").unwrap();
///
/// let params = pattern.match_path("/a/1/b/two").unwrap();
/// assert_eq!(params.get("x"), Some("1"));
/// assert_eq!(params.get("y"), Some("two"));
///
/// assert!(pattern.match_path("/a/1/c/two").is_none());
/// assert!(pattern.match_path("/a//b/two").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    template: String,
    segments: Vec<Segment>,
    param_count: usize,
}

/// Compiles a route template into a [`RoutePattern`].
pub fn compile(template: &str) -> Result<RoutePattern, PatternError> {
    let Some(body) = template.strip_prefix('/') else {
        return Err(PatternError::MissingLeadingSlash {
            template: template.to_string(),
        });
    };

    let mut seen = HashSet::new();
    let mut segments = Vec::new();

    for raw in body.split('/') {
        match raw.strip_prefix(PARAM_SENTINEL) {
            Some("") => {
                return Err(PatternError::EmptyParamName {
                    template: template.to_string(),
                });
            }
            Some(name) => {
                if !seen.insert(name) {
                    return Err(PatternError::DuplicateParam {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
                segments.push(Segment::Param(Arc::from(name)));
            }
            None => segments.push(Segment::Literal(raw.to_string())),
        }
    }

    Ok(RoutePattern {
        template: template.to_string(),
        param_count: seen.len(),
        segments,
    })
}

impl RoutePattern {
    /// Returns the template this pattern was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns parameter names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(&**name),
            Segment::Literal(_) => None,
        })
    }

    /// Matches a request path, returning captured parameters in template order.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let mut actual = path.strip_prefix('/')?.split('/');
        let mut params = Params::for_pattern(self.param_count);

        for segment in &self.segments {
            let value = actual.next()?;
            match segment {
                Segment::Literal(expected) => {
                    if expected != value {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if value.is_empty() {
                        return None;
                    }
                    params.push(Arc::clone(name), value);
                }
            }
        }

        // Anchored: leftover segments mean the path is longer than the template.
        if actual.next().is_some() {
            return None;
        }

        Some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
