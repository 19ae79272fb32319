use sqlx::FromRow;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub salary: f64,
    pub password_hash: Option<String>, // Argon2 hash; None for users created without a credential
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub salary: f64,
    pub password_hash: Option<String>,
}
