use async_trait::async_trait;

use super::{commit, snapshot, PgStore};
use crate::database::{ErrorExt, Result};
use crate::schema::User;
use crate::store::{FollowRepository, Paged};
use crate::types::id::{marker::UserMarker, Id};
use crate::types::Pagination;

#[async_trait]
impl FollowRepository for PgStore {
    #[tracing::instrument(skip(self), name = "db.follows.follow")]
    async fn follow(&self, user_id: Id<UserMarker>, author_id: Id<UserMarker>) -> Result<bool> {
        let mut tx = self.db_write().await?;
        let result = sqlx::query(
            r#"INSERT INTO "follows" (user_id, author_id) VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING"#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&mut *tx)
        .await
        .into_db_error()?;

        commit(tx).await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), name = "db.follows.unfollow")]
    async fn unfollow(&self, user_id: Id<UserMarker>, author_id: Id<UserMarker>) -> Result<bool> {
        let mut tx = self.db_write().await?;
        let result = sqlx::query(r#"DELETE FROM "follows" WHERE user_id = $1 AND author_id = $2"#)
            .bind(user_id)
            .bind(author_id)
            .execute(&mut *tx)
            .await
            .into_db_error()?;

        commit(tx).await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), name = "db.follows.is_following")]
    async fn is_following(
        &self,
        user_id: Id<UserMarker>,
        author_id: Id<UserMarker>,
    ) -> Result<bool> {
        let mut conn = self.db_read_prefer_primary().await?;
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (SELECT 1 FROM "follows" WHERE user_id = $1 AND author_id = $2)"#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&mut *conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "db.follows.followed_authors")]
    async fn followed_authors(
        &self,
        user_id: Id<UserMarker>,
        pagination: Pagination,
    ) -> Result<Paged<User>> {
        let mut conn = self.db_read().await?;
        let mut tx = snapshot(&mut conn).await?;
        let total =
            sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "follows" WHERE user_id = $1"#)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await
                .into_db_error()?;

        let items = sqlx::query_as::<_, User>(
            r#"SELECT u.* FROM "follows" f
            JOIN "users" u ON u.id = f.author_id
            WHERE f.user_id = $1
            ORDER BY f.id
            LIMIT $2 OFFSET $3"#,
        )
        .bind(user_id)
        .bind(i64::try_from(pagination.limit.get()).unwrap_or(i64::MAX))
        .bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX))
        .fetch_all(&mut *tx)
        .await
        .into_db_error()?;
        tx.commit().await.into_db_error()?;

        Ok(Paged {
            total: u64::try_from(total).unwrap_or_default(),
            items,
        })
    }
}
