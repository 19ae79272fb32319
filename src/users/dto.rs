use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::User;

/// Request body for the credential-less `/users/` path.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub salary: Option<f64>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub user_id: Uuid,
    pub username: String,
    pub salary: f64,
}

impl From<User> for UserOut {
    fn from(u: User) -> Self {
        Self {
            user_id: u.id,
            username: u.username,
            salary: u.salary,
        }
    }
}
