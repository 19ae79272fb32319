use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        FromRef, State,
    },
    routing::post,
    Form, Json, Router,
};
use tracing::instrument;

use super::{
    dto::{RegisterRequest, TokenForm, TokenResponse},
    jwt::JwtKeys,
    services,
};
use crate::{error::ApiError, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/token", post(token))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let (_, token) = services::register(
        state.store.as_ref(),
        &keys,
        &payload.username,
        payload.salary,
        &payload.password,
    )
    .await?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip(state, form))]
pub async fn token(
    State(state): State<AppState>,
    form: Result<Form<TokenForm>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Form(form) = form?;
    let keys = JwtKeys::from_ref(&state);
    let token =
        services::authenticate(state.store.as_ref(), &keys, &form.username, &form.password)
            .await?;
    Ok(Json(TokenResponse::bearer(token)))
}
