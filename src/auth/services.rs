use tracing::{info, warn};

use super::{jwt::JwtKeys, password};
use crate::{
    error::ApiError,
    store::Store,
    users::{self, repo_types::User},
};

const BAD_CREDENTIALS: &str = "Incorrect username or password";

/// Creates a user holding only the Argon2 hash of `secret` and returns a token for it.
pub async fn register(
    store: &dyn Store,
    keys: &JwtKeys,
    username: &str,
    salary: Option<f64>,
    secret: &str,
) -> Result<(User, String), ApiError> {
    password::validate_secret(secret)?;
    // Reject malformed names before paying for a hash.
    let username = users::services::normalize_username(username)?;
    let hash = password::hash_secret(secret)?;
    let user = users::services::create_user(store, &username, salary, Some(hash)).await?;
    let token = keys.sign(&user.username)?;
    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((user, token))
}

/// Unknown users, users without a credential and wrong secrets all get the
/// same `Unauthorized` answer.
pub async fn authenticate(
    store: &dyn Store,
    keys: &JwtKeys,
    username: &str,
    secret: &str,
) -> Result<String, ApiError> {
    let username = username.trim();
    let Some(user) = store.find_user_by_username(username).await? else {
        warn!(%username, "login for unknown user");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
    };

    let Some(hash) = user.password_hash.as_deref() else {
        warn!(user_id = %user.id, "login for user without credential");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
    };

    if !password::verify_secret(secret, hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    let token = keys.sign(&user.username)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}
