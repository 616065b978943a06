//! Route handlers.
//!
//! Each function takes the shared [`AppState`](crate::AppState) and returns
//! a ready-to-mount handler. Guarded handlers are built with
//! [`authenticated`](trove_middleware::authenticated) and receive the
//! caller identity directly.

pub mod admin;
pub mod auth;
pub mod collections;
pub mod comparisons;
pub mod public;
