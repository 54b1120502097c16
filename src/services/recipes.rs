use std::collections::HashSet;
use validator::{Validate, ValidateError};

use super::users::render_user;
use crate::http::routes::Endpoint;
use crate::http::{Error, Result};
use crate::schema::{MembershipKind, Recipe, User};
use crate::store::{Paged, RecipeFilter};
use crate::types::form::recipes::{
    CreateRecipe as CreateRecipeForm, IngredientEntry, UpdateRecipe as UpdateRecipeForm,
};
use crate::types::id::{
    marker::{RecipeMarker, TagMarker},
    Id,
};
use crate::types::query::RecipeQuery;
use crate::types::view::RecipeView;
use crate::App;

pub(crate) async fn render_recipe(
    app: &App,
    recipe: Recipe,
    viewer: Option<&User>,
) -> Result<RecipeView> {
    let store = app.store();
    let Some(author) = store.users().find_by_id(recipe.author_id).await? else {
        return Err(Error::new(crate::types::Error::Internal)
            .attach_printable(format!("author of recipe {} is missing", recipe.id)));
    };

    let tags = store.tags().for_recipe(recipe.id).await?;
    let ingredients = store.recipes().ingredient_rows(recipe.id).await?;
    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer) => {
            let memberships = store.memberships();
            (
                memberships
                    .contains(MembershipKind::Favorite, viewer.id, recipe.id)
                    .await?,
                memberships
                    .contains(MembershipKind::ShoppingList, viewer.id, recipe.id)
                    .await?,
            )
        }
        None => (false, false),
    };

    Ok(RecipeView {
        id: recipe.id,
        tags,
        author: render_user(app, author, viewer).await?,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

/// Rejects tags and ingredients that do not exist.
async fn check_references(
    app: &App,
    tags: Option<&[Id<TagMarker>]>,
    ingredients: Option<&[IngredientEntry]>,
) -> Result<()> {
    let mut fields = ValidateError::field_builder();

    if let Some(tags) = tags {
        let expected = tags.iter().collect::<HashSet<_>>().len();
        let found = app.store().tags().find_by_ids(tags).await?;
        if found.len() != expected {
            let mut error = ValidateError::msg_builder();
            error.insert("Unknown tag");
            fields.insert("tags", error.build());
        }
    }

    if let Some(entries) = ingredients {
        let ids = entries.iter().map(|entry| entry.id).collect::<Vec<_>>();
        let found = app
            .store()
            .ingredients()
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|ingredient| ingredient.id)
            .collect::<HashSet<_>>();

        let mut slice = ValidateError::slice_builder();
        for entry in entries {
            if found.contains(&entry.id) {
                slice.insert_empty();
            } else {
                slice.insert(ValidateError::field("id", "Unknown ingredient"));
            }
        }
        fields.insert("ingredients", slice.build());
    }

    fields.build().into_result()?;
    Ok(())
}

async fn find_owned(
    app: &App,
    endpoint: Endpoint,
    id: Id<RecipeMarker>,
    user: &User,
) -> Result<Recipe> {
    let Some(recipe) = app.store().recipes().find_by_id(id).await? else {
        return Err(Error::not_found("Recipe not found"));
    };

    if !endpoint.route().access.permits(Some(user), recipe.author_id) {
        return Err(Error::forbidden());
    }
    Ok(recipe)
}

#[derive(Debug)]
pub struct ListRecipes {
    pub query: RecipeQuery,
}

impl ListRecipes {
    #[tracing::instrument(skip(app, viewer), name = "services.recipes.list")]
    pub async fn perform(self, app: &App, viewer: Option<&User>) -> Result<Paged<RecipeView>> {
        let viewer_id = viewer.map(|user| user.id);
        let filter = RecipeFilter {
            author: self.query.author,
            tags: self.query.tags,
            // Membership filters only make sense for a signed in user
            favorited_by: viewer_id.filter(|_| self.query.is_favorited),
            in_shopping_list_of: viewer_id.filter(|_| self.query.is_in_shopping_cart),
        };

        let recipes = app
            .store()
            .recipes()
            .find_by_filter(&filter, self.query.pagination)
            .await?;

        let mut items = Vec::with_capacity(recipes.items.len());
        for recipe in recipes.items {
            items.push(render_recipe(app, recipe, viewer).await?);
        }

        Ok(Paged {
            total: recipes.total,
            items,
        })
    }
}

#[derive(Debug)]
pub struct GetRecipe {
    pub id: Id<RecipeMarker>,
}

impl GetRecipe {
    #[tracing::instrument(skip(app, viewer), name = "services.recipes.get")]
    pub async fn perform(self, app: &App, viewer: Option<&User>) -> Result<RecipeView> {
        let Some(recipe) = app.store().recipes().find_by_id(self.id).await? else {
            return Err(Error::not_found("Recipe not found"));
        };
        render_recipe(app, recipe, viewer).await
    }
}

#[derive(Debug)]
pub struct CreateRecipe {
    pub form: CreateRecipeForm,
}

impl CreateRecipe {
    #[tracing::instrument(skip_all, fields(user_id = %user.id), name = "services.recipes.create")]
    pub async fn perform(self, app: &App, user: &User) -> Result<RecipeView> {
        self.form.validate()?;
        check_references(
            app,
            Some(self.form.tags.as_slice()),
            Some(self.form.ingredients.as_slice()),
        )
        .await?;

        let recipe = app
            .store()
            .recipes()
            .create(&self.form.into_draft(user.id))
            .await?;

        tracing::debug!(recipe_id = %recipe.id, "created recipe");
        render_recipe(app, recipe, Some(user)).await
    }
}

#[derive(Debug)]
pub struct UpdateRecipe {
    pub id: Id<RecipeMarker>,
    pub form: UpdateRecipeForm,
}

impl UpdateRecipe {
    #[tracing::instrument(skip(app, user, self), fields(user_id = %user.id, recipe_id = %self.id), name = "services.recipes.update")]
    pub async fn perform(self, app: &App, user: &User) -> Result<RecipeView> {
        let recipe = find_owned(app, Endpoint::UpdateRecipe, self.id, user).await?;

        self.form.validate()?;
        check_references(
            app,
            self.form.tags.as_deref(),
            self.form.ingredients.as_deref(),
        )
        .await?;

        let Some(recipe) = app
            .store()
            .recipes()
            .update(recipe.id, &self.form.into_patch())
            .await?
        else {
            return Err(Error::not_found("Recipe not found"));
        };

        render_recipe(app, recipe, Some(user)).await
    }
}

#[derive(Debug)]
pub struct DeleteRecipe {
    pub id: Id<RecipeMarker>,
}

impl DeleteRecipe {
    #[tracing::instrument(skip(app, user), fields(user_id = %user.id), name = "services.recipes.delete")]
    pub async fn perform(self, app: &App, user: &User) -> Result<()> {
        let recipe = find_owned(app, Endpoint::DeleteRecipe, self.id, user).await?;
        if !app.store().recipes().delete(recipe.id).await? {
            return Err(Error::not_found("Recipe not found"));
        }
        Ok(())
    }
}
