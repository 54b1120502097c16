use error_stack::ResultExt;

use super::{
    FollowRepository, IngredientRepository, MembershipRepository, RecipeRepository, Store,
    TagRepository, UserRepository,
};
use crate::config;
use crate::database::{self, ErrorExt2, Pool, PoolConnection, Result, Transaction};

mod follows;
mod ingredients;
mod memberships;
mod recipes;
mod tags;
mod users;

/// Postgres backed store with an optional read replica.
///
/// Writes always go to the primary pool. Reads go to the replica when
/// one is configured and fall back to the primary if the replica pool
/// is unhealthy.
#[derive(Debug, Clone)]
pub struct PgStore {
    primary: Pool,
    replica: Option<Pool>,
}

impl PgStore {
    pub fn new(cfg: &config::Database) -> Result<Self> {
        let primary = Pool::new(cfg, &cfg.primary).attach_printable("while opening primary pool")?;
        let replica = match cfg.replica.as_ref() {
            Some(replica) => {
                Some(Pool::new(cfg, replica).attach_printable("while opening replica pool")?)
            }
            None => None,
        };
        Ok(Self { primary, replica })
    }

    #[must_use]
    pub fn primary(&self) -> &Pool {
        &self.primary
    }

    #[tracing::instrument(skip_all)]
    pub(super) async fn db_write(&self) -> Result<Transaction<'static>> {
        self.primary.begin().await
    }

    #[tracing::instrument(skip_all)]
    pub(super) async fn db_read(&self) -> Result<PoolConnection> {
        if let Some(replica) = self.replica.as_ref() {
            match replica.get().await {
                Ok(conn) => return Ok(conn),
                // fallback
                Err(err) if err.is_unhealthy() => {}
                Err(err) => return Err(err),
            }
        }
        self.primary.get().await
    }

    /// For reads that must observe the caller's own writes.
    #[tracing::instrument(skip_all)]
    pub(super) async fn db_read_prefer_primary(&self) -> Result<PoolConnection> {
        match (self.primary.get().await, self.replica.as_ref()) {
            (Ok(conn), ..) => Ok(conn),
            (Err(e), Some(replica)) if e.is_unhealthy() => replica.get().await,
            (Err(e), ..) => Err(e),
        }
    }
}

impl Store for PgStore {
    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn tags(&self) -> &dyn TagRepository {
        self
    }

    fn ingredients(&self) -> &dyn IngredientRepository {
        self
    }

    fn recipes(&self) -> &dyn RecipeRepository {
        self
    }

    fn memberships(&self) -> &dyn MembershipRepository {
        self
    }

    fn follows(&self) -> &dyn FollowRepository {
        self
    }
}

/// Commits a transaction opened by [`PgStore::db_write`].
async fn commit(tx: Transaction<'static>) -> Result<()> {
    use database::ErrorExt;
    tx.commit().await.into_db_error()
}

/// Opens a read-only `REPEATABLE READ` transaction on `conn` so that a
/// page and its total count are read from the same snapshot.
async fn snapshot(conn: &mut PoolConnection) -> Result<Transaction<'_>> {
    use database::ErrorExt;
    use sqlx::Connection;

    let mut tx = conn.begin().await.into_db_error()?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await
        .into_db_error()?;
    Ok(tx)
}

// Runs only when FOODGRAM_TEST_DATABASE_URL points at a disposable database.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{ErrorExt, ErrorExt2};
    use crate::schema::{MembershipKind, NewUser};
    use crate::types::id::Id;
    use std::num::{NonZeroU32, NonZeroU64};

    async fn store() -> Option<PgStore> {
        let url = std::env::var("FOODGRAM_TEST_DATABASE_URL").ok()?;
        let cfg = config::Database {
            primary: config::DbPoolConfig {
                readonly: false,
                min_idle: None,
                pool_size: NonZeroU32::new(2).unwrap(),
                url: url.into(),
            },
            replica: None,
            enforce_tls: false,
            timeout_secs: NonZeroU64::new(5).unwrap(),
        };
        let store = PgStore::new(&cfg).unwrap();
        store.primary().migrate().await.unwrap();
        Some(store)
    }

    #[tokio::test]
    async fn test_snapshot_isolation() {
        let Some(store) = store().await else { return };

        let mut conn = store.db_read().await.unwrap();
        let mut tx = snapshot(&mut conn).await.unwrap();
        let level = sqlx::query_scalar::<_, String>("SHOW transaction_isolation")
            .fetch_one(&mut *tx)
            .await
            .into_db_error()
            .unwrap();
        assert_eq!(level, "repeatable read");

        let readonly = sqlx::query_scalar::<_, String>("SHOW transaction_read_only")
            .fetch_one(&mut *tx)
            .await
            .into_db_error()
            .unwrap();
        assert_eq!(readonly, "on");
    }

    #[tokio::test]
    async fn test_membership_of_deleted_recipe() {
        let Some(store) = store().await else { return };

        let suffix = chrono::Utc::now().timestamp_micros();
        let user = store
            .users()
            .create(&NewUser {
                email: format!("ghost{suffix}@foodgram.io"),
                username: format!("ghost{suffix}"),
                first_name: "Ghost".into(),
                last_name: "Cook".into(),
                is_admin: false,
            })
            .await
            .unwrap();

        let report = store
            .memberships()
            .add(MembershipKind::Favorite, user.id, Id::new(i64::MAX as u64))
            .await
            .unwrap_err();
        assert!(report.is_missing_reference());
    }
}
