//! Sharing comparisons through public links.
//!
//! The owner generates or removes a link; anyone holding it can read the
//! comparison without signing in.

use std::sync::Arc;

use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use trove_core::{
    handler_fn, response, BoxedHandler, ErrorCategory, Identity, TroveError, TroveResult,
};
use trove_middleware::authenticated;
use uuid::Uuid;

use super::comparisons::{comparison_id, not_found};
use crate::AppState;

/// Attempts before giving up on finding an unused link.
const LINK_ATTEMPTS: usize = 5;

#[derive(Debug, Deserialize)]
struct PublicRequest {
    #[serde(default)]
    public_link: String,
}

fn new_link() -> String {
    Uuid::new_v4().simple().to_string()
}

fn generate(state: &AppState, user_id: i64, id: i64) -> TroveResult<String> {
    for _ in 0..LINK_ATTEMPTS {
        let link = new_link();
        match state.comparisons.set_public_link(user_id, id, Some(link.clone())) {
            Ok(Some(_)) => return Ok(link),
            Ok(None) => return Err(not_found()),
            Err(err) if err.category() == ErrorCategory::Conflict => continue,
            Err(err) => return Err(err),
        }
    }
    Err(TroveError::internal(format!(
        "Failed to generate public link after {LINK_ATTEMPTS} attempts"
    )))
}

/// `POST /comparisons/:id/public-link`: creates or replaces the link.
pub fn generate_link(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, ctx, _request| {
        let state = Arc::clone(&state);
        async move {
            let id = comparison_id(&ctx)?;
            let link = generate(&state, me.user_id, id)?;
            tracing::info!(user_id = me.user_id, comparison_id = id, "public link generated");
            Ok::<_, TroveError>(response::json(
                StatusCode::OK,
                &json!({
                    "public_link": link,
                    "message": "Public link generated successfully",
                }),
            ))
        }
    })
}

/// `DELETE /comparisons/:id/public-link`
pub fn remove_link(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, ctx, _request| {
        let state = Arc::clone(&state);
        async move {
            let id = comparison_id(&ctx)?;
            state
                .comparisons
                .set_public_link(me.user_id, id, None)?
                .ok_or_else(not_found)?;
            tracing::info!(user_id = me.user_id, comparison_id = id, "public link removed");
            Ok::<_, TroveError>(response::json(
                StatusCode::OK,
                &json!({ "message": "Public link removed successfully" }),
            ))
        }
    })
}

/// `POST /comparisons/public`: unauthenticated read of a shared comparison.
///
/// The body's `public_link` may be the bare link or a URL ending in it.
pub fn fetch_public(state: Arc<AppState>) -> BoxedHandler {
    handler_fn(move |_ctx, request| {
        let state = Arc::clone(&state);
        async move {
            let body: PublicRequest = response::parse_json(request).await?;
            let link = body.public_link.trim();
            if link.is_empty() {
                return Err(TroveError::validation("Public link is required"));
            }
            let comparison = state
                .comparisons
                .find_by_public_link(link)?
                .ok_or_else(not_found)?;
            Ok::<_, TroveError>(response::json(StatusCode::OK, &comparison.public_view()))
        }
    })
}
