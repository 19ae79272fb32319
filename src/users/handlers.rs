use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateUserRequest, UserOut},
    services,
};
use crate::{auth::jwt::AuthUser, error::ApiError, state::AppState};

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/", post(create_user))
        .route("/users/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<UserOut>, ApiError> {
    let Json(payload) = payload?;
    let user =
        services::create_user(state.store.as_ref(), &payload.username, payload.salary, None)
            .await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<Json<UserOut>, ApiError> {
    let user = services::find_by_username(state.store.as_ref(), &username)
        .await
        .map_err(|e| match e {
            // token outlived its user
            ApiError::NotFound(_) => ApiError::Unauthorized("Could not validate credentials".into()),
            other => other,
        })?;
    Ok(Json(user.into()))
}
