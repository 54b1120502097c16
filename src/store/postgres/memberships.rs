use async_trait::async_trait;

use super::{commit, PgStore};
use crate::database::{ErrorExt, Result};
use crate::schema::{MembershipKind, RecipeIngredient};
use crate::store::MembershipRepository;
use crate::types::id::{
    marker::{RecipeMarker, UserMarker},
    Id,
};

#[async_trait]
impl MembershipRepository for PgStore {
    #[tracing::instrument(skip(self), name = "db.memberships.add")]
    async fn add(
        &self,
        kind: MembershipKind,
        user_id: Id<UserMarker>,
        recipe_id: Id<RecipeMarker>,
    ) -> Result<bool> {
        let sql = format!(
            r#"INSERT INTO "{}" (user_id, recipe_id) VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING"#,
            kind.table()
        );

        let mut tx = self.db_write().await?;
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(&mut *tx)
            .await
            .into_db_error()?;

        commit(tx).await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), name = "db.memberships.remove")]
    async fn remove(
        &self,
        kind: MembershipKind,
        user_id: Id<UserMarker>,
        recipe_id: Id<RecipeMarker>,
    ) -> Result<bool> {
        let sql = format!(
            r#"DELETE FROM "{}" WHERE user_id = $1 AND recipe_id = $2"#,
            kind.table()
        );

        let mut tx = self.db_write().await?;
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(&mut *tx)
            .await
            .into_db_error()?;

        commit(tx).await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), name = "db.memberships.contains")]
    async fn contains(
        &self,
        kind: MembershipKind,
        user_id: Id<UserMarker>,
        recipe_id: Id<RecipeMarker>,
    ) -> Result<bool> {
        let sql = format!(
            r#"SELECT EXISTS (SELECT 1 FROM "{}" WHERE user_id = $1 AND recipe_id = $2)"#,
            kind.table()
        );

        let mut conn = self.db_read_prefer_primary().await?;
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .fetch_one(&mut *conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "db.memberships.shopping_rows")]
    async fn shopping_rows(&self, user_id: Id<UserMarker>) -> Result<Vec<RecipeIngredient>> {
        let mut conn = self.db_read_prefer_primary().await?;
        sqlx::query_as::<_, RecipeIngredient>(
            r#"SELECT i.id, i.name, i.measurement_unit, ia.amount
            FROM "shopping_list" s
            JOIN "ingredient_amounts" ia ON ia.recipe_id = s.recipe_id
            JOIN "ingredients" i ON i.id = ia.ingredient_id
            WHERE s.user_id = $1
            ORDER BY s.id, ia.id"#,
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .into_db_error()
    }
}
