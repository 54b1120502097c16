use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use super::{commit, snapshot, PgStore};
use crate::database::{ErrorExt, Result, Transaction};
use crate::schema::{IngredientAmount, Recipe, RecipeIngredient};
use crate::store::{Paged, RecipeDraft, RecipeFilter, RecipePatch, RecipeRepository};
use crate::types::id::{
    marker::{RecipeMarker, TagMarker, UserMarker},
    Id,
};
use crate::types::Pagination;

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn push_filter<'a>(query: &mut QueryBuilder<'a, Postgres>, filter: &'a RecipeFilter) {
    query.push(" WHERE TRUE");
    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ").push_bind(author);
    }
    if !filter.tags.is_empty() {
        query
            .push(
                r#" AND EXISTS (SELECT 1 FROM "recipe_tags" rt
                JOIN "tags" t ON t.id = rt.tag_id
                WHERE rt.recipe_id = r.id AND t.slug = ANY("#,
            )
            .push_bind(&filter.tags)
            .push("))");
    }
    if let Some(user) = filter.favorited_by {
        query
            .push(r#" AND EXISTS (SELECT 1 FROM "favorites" f WHERE f.recipe_id = r.id AND f.user_id = "#)
            .push_bind(user)
            .push(")");
    }
    if let Some(user) = filter.in_shopping_list_of {
        query
            .push(r#" AND EXISTS (SELECT 1 FROM "shopping_list" s WHERE s.recipe_id = r.id AND s.user_id = "#)
            .push_bind(user)
            .push(")");
    }
}

async fn insert_tags(
    tx: &mut Transaction<'static>,
    recipe_id: Id<RecipeMarker>,
    tags: &[Id<TagMarker>],
) -> Result<()> {
    if tags.is_empty() {
        return Ok(());
    }

    let mut query = QueryBuilder::<Postgres>::new(r#"INSERT INTO "recipe_tags" (recipe_id, tag_id) "#);
    query.push_values(tags, |mut row, tag| {
        row.push_bind(recipe_id).push_bind(*tag);
    });
    query
        .build()
        .execute(&mut **tx)
        .await
        .into_db_error()
        .map(|_| ())
}

async fn insert_amounts(
    tx: &mut Transaction<'static>,
    recipe_id: Id<RecipeMarker>,
    amounts: &[IngredientAmount],
) -> Result<()> {
    if amounts.is_empty() {
        return Ok(());
    }

    let mut query = QueryBuilder::<Postgres>::new(
        r#"INSERT INTO "ingredient_amounts" (recipe_id, ingredient_id, amount) "#,
    );
    query.push_values(amounts, |mut row, amount| {
        row.push_bind(recipe_id)
            .push_bind(amount.ingredient_id)
            .push_bind(amount.amount);
    });
    query
        .build()
        .execute(&mut **tx)
        .await
        .into_db_error()
        .map(|_| ())
}

#[async_trait]
impl RecipeRepository for PgStore {
    #[tracing::instrument(skip(self), name = "db.recipes.find_by_id")]
    async fn find_by_id(&self, id: Id<RecipeMarker>) -> Result<Option<Recipe>> {
        let mut conn = self.db_read_prefer_primary().await?;
        sqlx::query_as::<_, Recipe>(r#"SELECT * FROM "recipes" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "db.recipes.find_by_filter")]
    async fn find_by_filter(
        &self,
        filter: &RecipeFilter,
        pagination: Pagination,
    ) -> Result<Paged<Recipe>> {
        let mut conn = self.db_read().await?;
        let mut tx = snapshot(&mut conn).await?;

        let mut count = QueryBuilder::<Postgres>::new(r#"SELECT COUNT(*) FROM "recipes" r"#);
        push_filter(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await
            .into_db_error()?;

        let mut query = QueryBuilder::<Postgres>::new(r#"SELECT r.* FROM "recipes" r"#);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY r.id DESC LIMIT ")
            .push_bind(to_i64(pagination.limit.get()))
            .push(" OFFSET ")
            .push_bind(to_i64(pagination.offset()));

        let items = query
            .build_query_as::<Recipe>()
            .fetch_all(&mut *tx)
            .await
            .into_db_error()?;
        tx.commit().await.into_db_error()?;

        Ok(Paged {
            total: u64::try_from(total).unwrap_or_default(),
            items,
        })
    }

    #[tracing::instrument(skip(self), name = "db.recipes.find_by_author")]
    async fn find_by_author(
        &self,
        author_id: Id<UserMarker>,
        limit: Option<u64>,
    ) -> Result<Paged<Recipe>> {
        let mut conn = self.db_read().await?;
        let mut tx = snapshot(&mut conn).await?;
        let total = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM "recipes" WHERE author_id = $1"#,
        )
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await
        .into_db_error()?;

        let items = sqlx::query_as::<_, Recipe>(
            r#"SELECT * FROM "recipes" WHERE author_id = $1 ORDER BY id DESC LIMIT $2"#,
        )
        .bind(author_id)
        .bind(limit.map(to_i64))
        .fetch_all(&mut *tx)
        .await
        .into_db_error()?;
        tx.commit().await.into_db_error()?;

        Ok(Paged {
            total: u64::try_from(total).unwrap_or_default(),
            items,
        })
    }

    #[tracing::instrument(skip(self), name = "db.recipes.ingredient_rows")]
    async fn ingredient_rows(&self, id: Id<RecipeMarker>) -> Result<Vec<RecipeIngredient>> {
        let mut conn = self.db_read_prefer_primary().await?;
        sqlx::query_as::<_, RecipeIngredient>(
            r#"SELECT i.id, i.name, i.measurement_unit, ia.amount
            FROM "ingredient_amounts" ia
            JOIN "ingredients" i ON i.id = ia.ingredient_id
            WHERE ia.recipe_id = $1
            ORDER BY ia.id"#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip_all, fields(author_id = %draft.author_id), name = "db.recipes.create")]
    async fn create(&self, draft: &RecipeDraft) -> Result<Recipe> {
        let mut tx = self.db_write().await?;
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"INSERT INTO "recipes" (author_id, name, image, text, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *"#,
        )
        .bind(draft.author_id)
        .bind(&draft.name)
        .bind(&draft.image)
        .bind(&draft.text)
        .bind(draft.cooking_time)
        .fetch_one(&mut *tx)
        .await
        .into_db_error()?;

        insert_tags(&mut tx, recipe.id, &draft.tags).await?;
        insert_amounts(&mut tx, recipe.id, &draft.ingredients).await?;
        commit(tx).await?;

        Ok(recipe)
    }

    #[tracing::instrument(skip(self, patch), name = "db.recipes.update")]
    async fn update(&self, id: Id<RecipeMarker>, patch: &RecipePatch) -> Result<Option<Recipe>> {
        let mut tx = self.db_write().await?;
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"UPDATE "recipes" SET
                name = COALESCE($2, name),
                image = COALESCE($3, image),
                text = COALESCE($4, text),
                cooking_time = COALESCE($5, cooking_time)
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.image.as_deref())
        .bind(patch.text.as_deref())
        .bind(patch.cooking_time)
        .fetch_optional(&mut *tx)
        .await
        .into_db_error()?;

        let Some(recipe) = recipe else {
            return Ok(None);
        };

        if let Some(tags) = &patch.tags {
            sqlx::query(r#"DELETE FROM "recipe_tags" WHERE recipe_id = $1"#)
                .bind(id)
                .execute(&mut *tx)
                .await
                .into_db_error()?;
            insert_tags(&mut tx, id, tags).await?;
        }

        if let Some(ingredients) = &patch.ingredients {
            sqlx::query(r#"DELETE FROM "ingredient_amounts" WHERE recipe_id = $1"#)
                .bind(id)
                .execute(&mut *tx)
                .await
                .into_db_error()?;
            insert_amounts(&mut tx, id, ingredients).await?;
        }

        commit(tx).await?;
        Ok(Some(recipe))
    }

    #[tracing::instrument(skip(self), name = "db.recipes.delete")]
    async fn delete(&self, id: Id<RecipeMarker>) -> Result<bool> {
        let mut tx = self.db_write().await?;
        let result = sqlx::query(r#"DELETE FROM "recipes" WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await
            .into_db_error()?;

        commit(tx).await?;
        Ok(result.rows_affected() > 0)
    }
}
