//! Route table for the Trove API.

use std::sync::Arc;

use http::Method;
use trove_core::{handler_fn, response};
use trove_middleware::{
    AllowedOrigins, AuthGuard, CorsMiddleware, ErrorObserverMiddleware, LoggingMiddleware,
    Pipeline, RequireAdmin,
};
use trove_router::PatternError;
use trove_server::Router;

use crate::handlers::{admin, auth, collections, comparisons, public};
use crate::{AppState, LoadUserComparisons};

/// Builds the router with global middleware and every route mounted.
///
/// Each path also answers `OPTIONS` so browser preflights reach the CORS
/// stage instead of the unmatched-route 404.
///
/// # Errors
///
/// Fails only if a route template is malformed.
pub fn build_router(
    state: &Arc<AppState>,
    origins: AllowedOrigins,
) -> Result<Router, PatternError> {
    let router = Router::new();
    router.use_middleware(CorsMiddleware::new(origins));
    router.use_middleware(LoggingMiddleware::new());
    router.use_middleware(ErrorObserverMiddleware::new());

    let guard = AuthGuard::new(state.tokens.clone());

    router.handle_func(
        Method::POST,
        "/auth/telegram",
        auth::telegram_login(Arc::clone(state)),
    )?;
    router.handle_func(
        Method::GET,
        "/profile",
        guard.protect(auth::profile(Arc::clone(state))),
    )?;

    router.handle_func(
        Method::GET,
        "/collections",
        guard.protect(collections::list(Arc::clone(state))),
    )?;
    router.handle_func(
        Method::POST,
        "/collections",
        guard.protect(collections::create(Arc::clone(state))),
    )?;
    router.handle_func(
        Method::GET,
        "/collections/:id",
        guard.protect(collections::get(Arc::clone(state))),
    )?;
    router.handle_func(
        Method::PUT,
        "/collections/:id",
        guard.protect(collections::update(Arc::clone(state))),
    )?;
    router.handle_func(
        Method::DELETE,
        "/collections/:id",
        guard.protect(collections::delete(Arc::clone(state))),
    )?;

    let with_comparisons = Pipeline::new()
        .with(guard.clone())
        .with(LoadUserComparisons::new(Arc::clone(&state.comparisons)));
    router.handle_func(
        Method::GET,
        "/comparisons",
        with_comparisons.wrap(comparisons::list(Arc::clone(state))),
    )?;
    router.handle_func(
        Method::POST,
        "/comparisons",
        guard.protect(comparisons::create(Arc::clone(state))),
    )?;
    router.handle_func(
        Method::POST,
        "/comparisons/public",
        public::fetch_public(Arc::clone(state)),
    )?;
    router.handle_func(
        Method::GET,
        "/comparisons/:id",
        guard.protect(comparisons::get(Arc::clone(state))),
    )?;
    router.handle_func(
        Method::PUT,
        "/comparisons/:id",
        guard.protect(comparisons::update(Arc::clone(state))),
    )?;
    router.handle_func(
        Method::DELETE,
        "/comparisons/:id",
        guard.protect(comparisons::delete(Arc::clone(state))),
    )?;
    router.handle_func(
        Method::POST,
        "/comparisons/:id/public-link",
        guard.protect(public::generate_link(Arc::clone(state))),
    )?;
    router.handle_func(
        Method::DELETE,
        "/comparisons/:id/public-link",
        guard.protect(public::remove_link(Arc::clone(state))),
    )?;

    let admin_only = Pipeline::new().with(guard).with(RequireAdmin::new());
    router.handle_func(
        Method::GET,
        "/admin/users",
        admin_only.wrap(admin::list_users(Arc::clone(state))),
    )?;

    let mut paths: Vec<String> = Vec::new();
    for (_, path) in router.routes() {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    for path in &paths {
        router.handle_func(
            Method::OPTIONS,
            path,
            handler_fn(|_ctx, _req| async { response::no_content() }),
        )?;
    }

    tracing::debug!(routes = router.routes().len(), "routes registered");
    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trove_config::AuthSettings;

    #[test]
    fn test_route_table() {
        let state = Arc::new(AppState::from_settings(&AuthSettings::default()).unwrap());
        let router = build_router(&state, AllowedOrigins::Any).unwrap();

        let routes = router.routes();
        assert_eq!(routes.len(), 25);
        assert!(routes.contains(&(Method::POST, "/auth/telegram".to_string())));
        assert!(routes.contains(&(Method::DELETE, "/collections/:id".to_string())));
        assert!(routes.contains(&(Method::POST, "/comparisons/public".to_string())));
        assert!(routes.contains(&(Method::DELETE, "/comparisons/:id/public-link".to_string())));
        assert!(routes.contains(&(Method::GET, "/admin/users".to_string())));
        assert!(routes.contains(&(Method::OPTIONS, "/auth/telegram".to_string())));

        let options = routes.iter().filter(|(m, _)| *m == Method::OPTIONS).count();
        assert_eq!(options, 9);
        assert_eq!(
            router.middleware_names(),
            vec!["cors", "logging", "error_observer"]
        );
    }
}
