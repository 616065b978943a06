//! Login and profile.

use std::sync::Arc;

use http::StatusCode;
use serde::Deserialize;
use trove_auth::TelegramUser;
use trove_core::{
    handler_fn, response, BoxedHandler, ErrorCategory, Identity, Request, Response, Role,
    TroveError, TroveResult,
};
use trove_middleware::authenticated;

use crate::models::{NewUser, User};
use crate::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(rename = "initData")]
    init_data: String,
}

/// `POST /auth/telegram`: exchanges signed `initData` for a session token.
pub fn telegram_login(state: Arc<AppState>) -> BoxedHandler {
    handler_fn(move |_ctx, request| {
        let state = Arc::clone(&state);
        async move { login(&state, request).await }
    })
}

/// `GET /profile`: the caller's user record.
pub fn profile(state: Arc<AppState>) -> BoxedHandler {
    authenticated(move |me: Identity, _ctx, _request| {
        let state = Arc::clone(&state);
        async move { load_profile(&state, &me) }
    })
}

async fn login(state: &AppState, request: Request) -> TroveResult<Response> {
    let body: LoginRequest = response::parse_json(request).await?;

    let telegram = state
        .assertions
        .verify(&body.init_data)
        .map_err(|err| TroveError::authentication(format!("Invalid Telegram initData: {err}")))?;

    let user = find_or_create(state, &telegram)?;

    if let Err(err) = state.users.touch_last_active(user.id) {
        tracing::warn!(user_id = user.id, error = %err, "failed to update last activity");
    }
    let user = state.users.find(user.id)?.unwrap_or(user);

    let token = state
        .tokens
        .issue(&user.identity())
        .map_err(|err| TroveError::internal_with_source("Failed to issue token", err))?;

    tracing::info!(user_id = user.id, telegram_id = user.telegram_id, "user logged in");
    Ok(response::json(
        StatusCode::OK,
        &serde_json::json!({ "token": token, "user": user.view() }),
    ))
}

fn find_or_create(state: &AppState, telegram: &TelegramUser) -> TroveResult<User> {
    if let Some(user) = state.users.find_by_telegram_id(telegram.id)? {
        return Ok(user);
    }

    let new_user = NewUser {
        telegram_id: telegram.id,
        first_name: telegram.first_name.clone(),
        last_name: telegram.last_name.clone(),
        username: telegram.username.clone(),
        generated_name: telegram.first_name.clone(),
        role: Role::User,
    };
    match state.users.create(new_user) {
        Ok(user) => {
            tracing::info!(user_id = user.id, telegram_id = user.telegram_id, "user registered");
            Ok(user)
        }
        // A concurrent first login got there first.
        Err(err) if err.category() == ErrorCategory::Conflict => state
            .users
            .find_by_telegram_id(telegram.id)?
            .ok_or(err),
        Err(err) => Err(err),
    }
}

fn load_profile(state: &AppState, me: &Identity) -> TroveResult<Response> {
    let user = state
        .users
        .find(me.user_id)?
        .ok_or_else(|| TroveError::not_found("User not found"))?;
    Ok(response::json(StatusCode::OK, &user.view()))
}
