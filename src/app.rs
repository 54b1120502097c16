use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    config,
    store::{MemoryStore, PgStore, Store},
};

/// Shared state of the web server: configuration and the store.
#[derive(Clone)]
pub struct App {
    pub config: Arc<config::Server>,
    store: Arc<dyn Store>,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    /// Connects to the Postgres database described by `cfg.db`.
    #[tracing::instrument(skip_all)]
    pub async fn new(cfg: config::Server) -> Result<Self, AppError> {
        let db = cfg
            .db
            .as_ref()
            .ok_or(AppError)
            .attach_printable("database configuration is missing, set DATABASE_URL")?;

        let store = PgStore::new(db).change_context(AppError)?;
        if let Err(error) = store.primary().wait_until_healthy().await {
            tracing::warn!(?error, "primary database is not reachable yet");
        }

        Ok(Self::with_store(cfg, store))
    }

    /// Development mode: everything lives in process memory.
    #[must_use]
    pub fn in_memory(cfg: config::Server) -> Self {
        Self::with_store(cfg, MemoryStore::with_default_tags())
    }

    #[must_use]
    pub fn with_store(cfg: config::Server, store: impl Store) -> Self {
        Self {
            config: Arc::new(cfg),
            store: Arc::new(store),
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        &*self.store
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
