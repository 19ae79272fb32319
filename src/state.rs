use crate::config::AppConfig;
use crate::store::{memory::MemoryStore, postgres::PgStore, Store};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match config.database_url.as_deref() {
            Some(url) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;
                let store = PgStore::new(db);
                store.ensure_schema().await?;
                Arc::new(store) as Arc<dyn Store>
            }
            None => {
                tracing::warn!("DATABASE_URL not set; records are kept in memory only");
                Arc::new(MemoryStore::new()) as Arc<dyn Store>
            }
        };

        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(MemoryStore::new()),
            Arc::new(AppConfig::for_tests()),
        )
    }
}
