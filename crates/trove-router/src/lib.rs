//! Path pattern router for Trove.
//!
//! This crate turns route templates such as `/collections/:id` into
//! compiled [`RoutePattern`]s and keeps them in a [`RouteTable`] keyed by
//! HTTP method. Lookups are linear over the routes registered for a method
//! and the **first** matching pattern wins: registration order decides
//! overlaps, not specificity.
//!
//! # Features
//!
//! - **Named Parameters**: segments starting with `:` capture one path segment
//! - **Anchored Matching**: a pattern matches the whole path, never a prefix
//! - **Concurrent Lookup**: the table sits behind a reader/writer lock
//! - **Startup Validation**: malformed templates fail with [`PatternError`]
//!
//! # Example
//!
//! ```rust
//! use trove_router::RouteTable;
//! use http::Method;
//!
//! let table = RouteTable::new();
//! table.register(Method::GET, "/items/:id", "getItem").unwrap();
//! table.register(Method::GET, "/items/new", "newItem").unwrap();
//!
//! // First registered pattern wins
//! let m = table.dispatch(&Method::GET, "/items/new").unwrap();
//! assert_eq!(m.handler, "getItem");
//! assert_eq!(m.params.get("id"), Some("new"));
//! ```

mod params;
mod pattern;
mod table;

pub use params::Params;
pub use pattern::{compile, PatternError, RoutePattern, PARAM_SENTINEL};
pub use table::{RouteMatch, RouteTable};
