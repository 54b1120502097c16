use crate::http::{Error, Result};
use crate::schema::{Ingredient, NewIngredient};
use crate::types::id::{marker::IngredientMarker, Id};
use crate::types::query::IngredientQuery;
use crate::App;

#[derive(Debug)]
pub struct ListIngredients {
    pub query: IngredientQuery,
}

impl ListIngredients {
    #[tracing::instrument(skip(app), name = "services.ingredients.list")]
    pub async fn perform(self, app: &App) -> Result<Vec<Ingredient>> {
        let ingredients = app
            .store()
            .ingredients()
            .find_by_filter(self.query.name.as_deref())
            .await?;

        Ok(ingredients)
    }
}

#[derive(Debug)]
pub struct GetIngredient {
    pub id: Id<IngredientMarker>,
}

impl GetIngredient {
    #[tracing::instrument(skip(app), name = "services.ingredients.get")]
    pub async fn perform(self, app: &App) -> Result<Ingredient> {
        app.store()
            .ingredients()
            .find_by_id(self.id)
            .await?
            .ok_or_else(|| Error::not_found("Ingredient not found"))
    }
}

/// Bulk load of reference data, used by `foodgram import-ingredients`.
#[derive(Debug)]
pub struct ImportIngredients {
    pub ingredients: Vec<NewIngredient>,
}

impl ImportIngredients {
    #[tracing::instrument(skip_all, fields(count = self.ingredients.len()), name = "services.ingredients.import")]
    pub async fn perform(self, app: &App) -> Result<u64> {
        let ingredients = self
            .ingredients
            .into_iter()
            .map(|ingredient| NewIngredient {
                name: ingredient.name.trim().to_string(),
                measurement_unit: ingredient.measurement_unit.trim().to_string(),
            })
            .filter(|ingredient| !ingredient.name.is_empty())
            .collect::<Vec<_>>();

        Ok(app.store().ingredients().create_many(&ingredients).await?)
    }
}
