use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub salary: Option<f64>,
    pub password: String,
}

/// Form body for `/auth/token` (OAuth2 password-flow field names).
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}
