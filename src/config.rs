use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// When unset the service keeps its records in memory.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "expense-tracker".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "expense-tracker-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(60),
        };
        Ok(Self { database_url, jwt })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60,
            },
        }
    }
}
