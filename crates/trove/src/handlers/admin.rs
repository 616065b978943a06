//! Admin-only endpoints. Mounted behind `RequireAdmin`.

use std::sync::Arc;

use http::StatusCode;
use trove_core::{response, BoxedHandler, Identity, TroveError};
use trove_middleware::authenticated;

use crate::AppState;

/// `GET /admin/users`
pub fn list_users(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, _ctx, _request| {
        let state = Arc::clone(&state);
        async move {
            let users = state.users.list()?;
            tracing::info!(caller = %me.log_id(), count = users.len(), "listed users");
            let views: Vec<_> = users.iter().map(|u| u.view()).collect();
            Ok::<_, TroveError>(response::json(StatusCode::OK, &views))
        }
    })
}
