use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use super::{commit, PgStore};
use crate::database::{ErrorExt, Result};
use crate::schema::{Ingredient, NewIngredient};
use crate::store::IngredientRepository;
use crate::types::id::{marker::IngredientMarker, Id};

/// Postgres caps a statement at 65535 bind parameters.
const IMPORT_CHUNK: usize = 1000;

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl IngredientRepository for PgStore {
    #[tracing::instrument(skip(self), name = "db.ingredients.find_by_filter")]
    async fn find_by_filter(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>> {
        let mut conn = self.db_read().await?;
        let mut query = QueryBuilder::<Postgres>::new(r#"SELECT * FROM "ingredients""#);
        if let Some(prefix) = name_prefix {
            query
                .push(" WHERE LOWER(name) LIKE ")
                .push_bind(format!("{}%", escape_like(&prefix.to_lowercase())));
        }
        query.push(" ORDER BY id DESC");

        query
            .build_query_as::<Ingredient>()
            .fetch_all(&mut *conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "db.ingredients.find_by_id")]
    async fn find_by_id(&self, id: Id<IngredientMarker>) -> Result<Option<Ingredient>> {
        let mut conn = self.db_read().await?;
        sqlx::query_as::<_, Ingredient>(r#"SELECT * FROM "ingredients" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "db.ingredients.find_by_ids")]
    async fn find_by_ids(&self, ids: &[Id<IngredientMarker>]) -> Result<Vec<Ingredient>> {
        let mut conn = self.db_read().await?;
        sqlx::query_as::<_, Ingredient>(
            r#"SELECT * FROM "ingredients" WHERE id = ANY($1) ORDER BY id"#,
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip_all, fields(count = ingredients.len()), name = "db.ingredients.create_many")]
    async fn create_many(&self, ingredients: &[NewIngredient]) -> Result<u64> {
        let mut tx = self.db_write().await?;
        let mut inserted = 0;
        for chunk in ingredients.chunks(IMPORT_CHUNK) {
            let mut query = QueryBuilder::<Postgres>::new(
                r#"INSERT INTO "ingredients" (name, measurement_unit) "#,
            );
            query.push_values(chunk, |mut row, ingredient| {
                row.push_bind(&ingredient.name)
                    .push_bind(&ingredient.measurement_unit);
            });

            inserted += query
                .build()
                .execute(&mut *tx)
                .await
                .into_db_error()?
                .rows_affected();
        }
        commit(tx).await?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("milk"), "milk");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
