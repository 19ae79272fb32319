use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::repo_types::{NewUser, User};
use crate::{error::ApiError, store::Store};

/// Trims the name and checks it is 1-64 characters without whitespace.
pub(crate) fn normalize_username(raw: &str) -> Result<String, ApiError> {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^\S{1,64}$").unwrap();
    }
    let username = raw.trim();
    if !USERNAME_RE.is_match(username) {
        return Err(ApiError::Validation(
            "Username must be 1-64 characters without spaces".into(),
        ));
    }
    Ok(username.to_owned())
}

/// Inserts a user after the duplicate check. The store enforces uniqueness
/// again at insert time, so two racing registrations cannot both succeed.
pub async fn create_user(
    store: &dyn Store,
    username: &str,
    salary: Option<f64>,
    password_hash: Option<String>,
) -> Result<User, ApiError> {
    let username = normalize_username(username)?;
    let salary = salary.unwrap_or(0.0);
    if !salary.is_finite() {
        return Err(ApiError::Validation("Salary must be a finite number".into()));
    }

    if store.find_user_by_username(&username).await?.is_some() {
        warn!(%username, "username already exists");
        return Err(ApiError::Conflict("Username already exists".into()));
    }

    let user = store
        .create_user(NewUser {
            username,
            salary,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok(user)
}

pub async fn find_by_username(store: &dyn Store, username: &str) -> Result<User, ApiError> {
    store
        .find_user_by_username(username)
        .await?
        .ok_or_else(ApiError::user_not_found)
}
