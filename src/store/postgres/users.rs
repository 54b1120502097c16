use async_trait::async_trait;

use super::{commit, PgStore};
use crate::database::{ErrorExt, Result};
use crate::schema::{NewUser, User};
use crate::store::UserRepository;
use crate::types::id::{marker::UserMarker, Id};

#[async_trait]
impl UserRepository for PgStore {
    #[tracing::instrument(skip(self), name = "db.users.find_by_id")]
    async fn find_by_id(&self, id: Id<UserMarker>) -> Result<Option<User>> {
        let mut conn = self.db_read().await?;
        sqlx::query_as::<_, User>(r#"SELECT * FROM "users" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip_all, name = "db.users.create")]
    async fn create(&self, user: &NewUser) -> Result<User> {
        let mut tx = self.db_write().await?;
        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO "users" (email, username, first_name, last_name, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *"#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_admin)
        .fetch_one(&mut *tx)
        .await
        .into_db_error()?;

        commit(tx).await?;
        Ok(user)
    }
}
