//! Comparison CRUD, scoped to the calling user.

use std::sync::Arc;

use http::StatusCode;
use trove_core::{response, BoxedHandler, Identity, RequestContext, TroveError, TroveResult};
use trove_middleware::authenticated;

use crate::middleware::UserComparisons;
use crate::models::{ComparisonUpdate, NewComparison};
use crate::AppState;

pub(crate) fn comparison_id(ctx: &RequestContext) -> TroveResult<i64> {
    ctx.params()
        .parse::<i64>("id")
        .and_then(Result::ok)
        .filter(|id| *id > 0)
        .ok_or_else(|| TroveError::validation("Comparison ID is required"))
}

pub(crate) fn not_found() -> TroveError {
    TroveError::not_found("Comparison not found")
}

fn validate(name: &str, price_weight: i32, pros_cons_weight: i32) -> TroveResult<()> {
    if name.trim().is_empty() {
        return Err(TroveError::validation("Comparison name is required"));
    }
    if price_weight < 0 || pros_cons_weight < 0 {
        return Err(TroveError::validation("Rating weights must not be negative"));
    }
    Ok(())
}

/// `GET /comparisons`
///
/// Served from the list [`LoadUserComparisons`](crate::LoadUserComparisons)
/// put in the context; reads the store itself when mounted without it.
pub fn list(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, ctx, _request| {
        let state = Arc::clone(&state);
        async move {
            let comparisons = match ctx.get::<UserComparisons>() {
                Some(loaded) => loaded.0.clone(),
                None => state.comparisons.list_for(me.user_id)?,
            };
            Ok::<_, TroveError>(response::json(StatusCode::OK, &comparisons))
        }
    })
}

/// `POST /comparisons`
pub fn create(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, _ctx, request| {
        let state = Arc::clone(&state);
        async move {
            let body: NewComparison = response::parse_json(request).await?;
            validate(&body.name, body.price_rating_weight, body.pros_cons_rating_weight)?;
            let comparison = state
                .comparisons
                .create(me.user_id, body.with_default_weights())?;
            tracing::debug!(
                user_id = me.user_id,
                comparison_id = comparison.id,
                items = comparison.items.len(),
                "comparison created"
            );
            Ok::<_, TroveError>(response::json(StatusCode::CREATED, &comparison))
        }
    })
}

/// `GET /comparisons/:id`
pub fn get(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, ctx, _request| {
        let state = Arc::clone(&state);
        async move {
            let id = comparison_id(&ctx)?;
            let comparison = state.comparisons.get(me.user_id, id)?.ok_or_else(not_found)?;
            Ok::<_, TroveError>(response::json(StatusCode::OK, &comparison))
        }
    })
}

/// `PUT /comparisons/:id`
pub fn update(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, ctx, request| {
        let state = Arc::clone(&state);
        async move {
            let id = comparison_id(&ctx)?;
            let body: ComparisonUpdate = response::parse_json(request).await?;
            validate(&body.name, body.price_rating_weight, body.pros_cons_rating_weight)?;
            let comparison = state
                .comparisons
                .update(me.user_id, id, body)?
                .ok_or_else(not_found)?;
            Ok::<_, TroveError>(response::json(StatusCode::OK, &comparison))
        }
    })
}

/// `DELETE /comparisons/:id`
pub fn delete(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, ctx, _request| {
        let state = Arc::clone(&state);
        async move {
            let id = comparison_id(&ctx)?;
            if !state.comparisons.delete(me.user_id, id)? {
                return Err(not_found());
            }
            tracing::debug!(user_id = me.user_id, comparison_id = id, "comparison deleted");
            Ok::<_, TroveError>(response::no_content())
        }
    })
}
