//! Collection CRUD, scoped to the calling user.

use std::sync::Arc;

use http::StatusCode;
use trove_core::{response, BoxedHandler, Identity, RequestContext, TroveError, TroveResult};
use trove_middleware::authenticated;

use crate::models::{CollectionUpdate, NewCollection};
use crate::AppState;

fn collection_id(ctx: &RequestContext) -> TroveResult<i64> {
    ctx.params()
        .parse::<i64>("id")
        .and_then(Result::ok)
        .filter(|id| *id > 0)
        .ok_or_else(|| TroveError::validation("Collection ID is required"))
}

fn not_found() -> TroveError {
    TroveError::not_found("Collection not found")
}

fn require_name(name: &str) -> TroveResult<()> {
    if name.trim().is_empty() {
        return Err(TroveError::validation("Collection name is required"));
    }
    Ok(())
}

/// `GET /collections`
pub fn list(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, _ctx, _request| {
        let state = Arc::clone(&state);
        async move {
            let collections = state.collections.list_for(me.user_id)?;
            Ok::<_, TroveError>(response::json(StatusCode::OK, &collections))
        }
    })
}

/// `POST /collections`
pub fn create(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, _ctx, request| {
        let state = Arc::clone(&state);
        async move {
            let body: NewCollection = response::parse_json(request).await?;
            require_name(&body.name)?;
            let collection = state.collections.create(me.user_id, body)?;
            tracing::debug!(user_id = me.user_id, collection_id = collection.id, "collection created");
            Ok::<_, TroveError>(response::json(StatusCode::CREATED, &collection))
        }
    })
}

/// `GET /collections/:id`
pub fn get(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, ctx, _request| {
        let state = Arc::clone(&state);
        async move {
            let id = collection_id(&ctx)?;
            let collection = state.collections.get(me.user_id, id)?.ok_or_else(not_found)?;
            Ok::<_, TroveError>(response::json(StatusCode::OK, &collection))
        }
    })
}

/// `PUT /collections/:id`
pub fn update(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, ctx, request| {
        let state = Arc::clone(&state);
        async move {
            let id = collection_id(&ctx)?;
            let body: CollectionUpdate = response::parse_json(request).await?;
            if let Some(name) = &body.name {
                require_name(name)?;
            }
            let collection = state
                .collections
                .update(me.user_id, id, body)?
                .ok_or_else(not_found)?;
            Ok::<_, TroveError>(response::json(StatusCode::OK, &collection))
        }
    })
}

/// `DELETE /collections/:id`
pub fn delete(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, ctx, _request| {
        let state = Arc::clone(&state);
        async move {
            let id = collection_id(&ctx)?;
            if !state.collections.delete(me.user_id, id)? {
                return Err(not_found());
            }
            tracing::debug!(user_id = me.user_id, collection_id = id, "collection deleted");
            Ok::<_, TroveError>(response::no_content())
        }
    })
}
