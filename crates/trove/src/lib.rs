//! # Trove
//!
//! Backend for the Trove Telegram mini-app.
//!
//! Users sign in with the Web App `initData` Telegram hands the client,
//! receive a bearer token, and manage their own collections and item
//! comparisons. A comparison can be shared read-only through a public
//! link. Admins can list every user.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use trove::{build_router, AppState};
//! use trove_config::TroveConfig;
//! use trove_middleware::AllowedOrigins;
//!
//! let config = TroveConfig::development();
//! let state = Arc::new(AppState::from_settings(&config.auth).expect("verifier key"));
//! let origins = AllowedOrigins::from_config(&config.server.cors_allowed_origins);
//! let router = build_router(&state, origins).expect("static routes compile");
//! # let _ = router;
//! ```

#![doc(html_root_url = "https://docs.rs/trove/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use middleware::{LoadUserComparisons, UserComparisons};
pub use models::{
    Collection, CollectionUpdate, Comparison, ComparisonItem, ComparisonUpdate, NewCollection,
    NewComparison, NewUser, ProCon, PublicComparison, User, UserView,
};
pub use routes::build_router;
pub use state::AppState;
pub use store::{
    CollectionStore, ComparisonStore, MemoryCollectionStore, MemoryComparisonStore,
    MemoryUserStore, UserStore,
};
