//! Credential secrets: the acceptance policy plus Argon2 storage and checking.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::ApiError;

/// The only requirement on a secret is that it is non-empty.
pub fn validate_secret(plain: &str) -> Result<(), ApiError> {
    if plain.is_empty() {
        return Err(ApiError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Checks the policy, then returns the PHC-encoded Argon2 hash of `plain`.
pub fn hash_secret(plain: &str) -> Result<String, ApiError> {
    validate_secret(plain)?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "could not hash credential");
            ApiError::Internal(anyhow::anyhow!("credential hashing failed: {e}"))
        })?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash cannot be parsed.
pub fn verify_secret(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored credential hash is unreadable");
        anyhow::anyhow!("unreadable credential hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
