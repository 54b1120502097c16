use error_stack::{Report, ResultExt};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::{str::FromStr, time::Duration};

use crate::config;

mod error;
pub use error::*;

pub type Transaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
pub type PoolConnection = sqlx::pool::PoolConnection<sqlx::Postgres>;

/// Schema migrations embedded from the `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// A Postgres database connection pool.
///
/// Connections are established lazily; [`Pool::wait_until_healthy`]
/// can be used at startup to fail fast on a bad configuration.
#[derive(Clone)]
pub struct Pool {
    pool: sqlx::PgPool,
    readonly: bool,
}

impl Pool {
    pub fn new(global_cfg: &config::Database, pool_cfg: &config::DbPoolConfig) -> Result<Self> {
        let mut pool_opts = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(global_cfg.timeout_secs.get()))
            .max_connections(pool_cfg.pool_size.get());

        if let Some(min_idle) = pool_cfg.min_idle {
            pool_opts = pool_opts.min_connections(min_idle.get());
        }

        let mut connect_opts = PgConnectOptions::from_str(pool_cfg.url.as_str())
            .change_context(Error::InvalidUrl)?;

        if global_cfg.enforce_tls {
            connect_opts = connect_opts.ssl_mode(PgSslMode::Require);
        }

        Ok(Self {
            pool: pool_opts.connect_lazy_with(connect_opts),
            readonly: pool_cfg.readonly,
        })
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("connections", &self.pool.size())
            .field("readonly", &self.readonly)
            .finish()
    }
}

impl Pool {
    /// Starts a write transaction.
    #[tracing::instrument(name = "db.transaction", skip(self))]
    pub async fn begin(&self) -> Result<Transaction<'static>> {
        if self.readonly {
            return Err(Report::new(Error::Readonly));
        }
        self.pool.begin().await.into_db_error()
    }

    #[tracing::instrument(name = "db.connect", skip(self))]
    pub async fn get(&self) -> Result<PoolConnection> {
        self.pool.acquire().await.into_db_error()
    }

    #[tracing::instrument(skip(self))]
    pub async fn wait_until_healthy(&self) -> Result<()> {
        self.get().await.map(|_| ())
    }

    #[tracing::instrument(skip(self))]
    pub async fn migrate(&self) -> Result<()> {
        if self.readonly {
            return Err(Report::new(Error::Readonly));
        }
        MIGRATOR
            .run(&self.pool)
            .await
            .change_context(Error::Migration)
    }
}
