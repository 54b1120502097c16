use async_trait::async_trait;

use super::PgStore;
use crate::database::{ErrorExt, Result};
use crate::schema::Tag;
use crate::store::TagRepository;
use crate::types::id::{
    marker::{RecipeMarker, TagMarker},
    Id,
};

#[async_trait]
impl TagRepository for PgStore {
    #[tracing::instrument(skip(self), name = "db.tags.list")]
    async fn list(&self) -> Result<Vec<Tag>> {
        let mut conn = self.db_read().await?;
        sqlx::query_as::<_, Tag>(r#"SELECT * FROM "tags" ORDER BY id DESC"#)
            .fetch_all(&mut *conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "db.tags.find_by_id")]
    async fn find_by_id(&self, id: Id<TagMarker>) -> Result<Option<Tag>> {
        let mut conn = self.db_read().await?;
        sqlx::query_as::<_, Tag>(r#"SELECT * FROM "tags" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "db.tags.find_by_ids")]
    async fn find_by_ids(&self, ids: &[Id<TagMarker>]) -> Result<Vec<Tag>> {
        let mut conn = self.db_read().await?;
        sqlx::query_as::<_, Tag>(r#"SELECT * FROM "tags" WHERE id = ANY($1) ORDER BY id"#)
            .bind(ids)
            .fetch_all(&mut *conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "db.tags.for_recipe")]
    async fn for_recipe(&self, recipe_id: Id<RecipeMarker>) -> Result<Vec<Tag>> {
        let mut conn = self.db_read_prefer_primary().await?;
        sqlx::query_as::<_, Tag>(
            r#"SELECT t.* FROM "tags" t
            JOIN "recipe_tags" rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.id"#,
        )
        .bind(recipe_id)
        .fetch_all(&mut *conn)
        .await
        .into_db_error()
    }
}
