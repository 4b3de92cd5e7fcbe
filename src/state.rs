use crate::auth::session::{MemorySessionStore, SessionStore, SqliteSessionStore};
use crate::config::{AppConfig, SessionBackend};
use crate::db;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env()?).await
    }

    /// Connect, migrate and pick the session store named by `config`.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config.database_url).await?;
        db::migrate(&db).await?;

        let sessions = match config.session_backend {
            SessionBackend::Sqlite => Arc::new(SqliteSessionStore::new(db.clone())) as Arc<dyn SessionStore>,
            SessionBackend::Memory => Arc::new(MemorySessionStore::new()) as Arc<dyn SessionStore>,
        };

        tracing::info!(backend = ?config.session_backend, "session store ready");
        Ok(Self::from_parts(db, Arc::new(config), sessions))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            db,
            config,
            sessions,
        }
    }

    /// Migrated in-memory database with in-memory sessions.
    #[cfg(test)]
    pub async fn for_tests() -> Self {
        Self::from_config(AppConfig::for_tests())
            .await
            .expect("test state")
    }
}
