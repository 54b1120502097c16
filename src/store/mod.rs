//! Persistence boundary of Foodgram.
//!
//! Every entity is reached through a repository trait so services can
//! run against Postgres ([`PgStore`]) or the in-memory store
//! ([`MemoryStore`]) used by tests and `foodgram server --in-memory`.
use async_trait::async_trait;

use crate::database::Result;
use crate::schema::{
    Ingredient, IngredientAmount, MembershipKind, NewIngredient, NewUser, Recipe,
    RecipeIngredient, Tag, User,
};
use crate::types::id::{
    marker::{IngredientMarker, RecipeMarker, TagMarker, UserMarker},
    Id,
};
use crate::types::Pagination;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Rows of one page plus the amount of rows across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    pub total: u64,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<Id<UserMarker>>,
    /// Tag slugs, any of them must match.
    pub tags: Vec<String>,
    pub favorited_by: Option<Id<UserMarker>>,
    pub in_shopping_list_of: Option<Id<UserMarker>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub author_id: Id<UserMarker>,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<Id<TagMarker>>,
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Partial recipe update; present collections replace the stored ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<Id<TagMarker>>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Id<UserMarker>) -> Result<Option<User>>;
    async fn create(&self, user: &NewUser) -> Result<User>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags, newest first.
    async fn list(&self) -> Result<Vec<Tag>>;
    async fn find_by_id(&self, id: Id<TagMarker>) -> Result<Option<Tag>>;
    async fn find_by_ids(&self, ids: &[Id<TagMarker>]) -> Result<Vec<Tag>>;
    async fn for_recipe(&self, recipe_id: Id<RecipeMarker>) -> Result<Vec<Tag>>;
}

#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Ingredients whose name starts with `name_prefix` ignoring case,
    /// newest first. `None` lists every ingredient.
    async fn find_by_filter(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>>;
    async fn find_by_id(&self, id: Id<IngredientMarker>) -> Result<Option<Ingredient>>;
    async fn find_by_ids(&self, ids: &[Id<IngredientMarker>]) -> Result<Vec<Ingredient>>;
    /// Returns the amount of inserted rows.
    async fn create_many(&self, ingredients: &[NewIngredient]) -> Result<u64>;
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn find_by_id(&self, id: Id<RecipeMarker>) -> Result<Option<Recipe>>;
    /// Recipes matching `filter`, newest first.
    async fn find_by_filter(
        &self,
        filter: &RecipeFilter,
        pagination: Pagination,
    ) -> Result<Paged<Recipe>>;
    /// Newest recipes of an author together with the amount of
    /// recipes the author has.
    async fn find_by_author(
        &self,
        author_id: Id<UserMarker>,
        limit: Option<u64>,
    ) -> Result<Paged<Recipe>>;
    async fn ingredient_rows(&self, id: Id<RecipeMarker>) -> Result<Vec<RecipeIngredient>>;
    async fn create(&self, draft: &RecipeDraft) -> Result<Recipe>;
    /// `None` if the recipe does not exist.
    async fn update(&self, id: Id<RecipeMarker>, patch: &RecipePatch) -> Result<Option<Recipe>>;
    /// Returns `false` if the recipe does not exist.
    async fn delete(&self, id: Id<RecipeMarker>) -> Result<bool>;
}

/// Favorites and shopping list entries.
///
/// `add` and `remove` report whether a row was actually inserted or
/// deleted; uniqueness of `(user, recipe)` is enforced by storage.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn add(
        &self,
        kind: MembershipKind,
        user_id: Id<UserMarker>,
        recipe_id: Id<RecipeMarker>,
    ) -> Result<bool>;
    async fn remove(
        &self,
        kind: MembershipKind,
        user_id: Id<UserMarker>,
        recipe_id: Id<RecipeMarker>,
    ) -> Result<bool>;
    async fn contains(
        &self,
        kind: MembershipKind,
        user_id: Id<UserMarker>,
        recipe_id: Id<RecipeMarker>,
    ) -> Result<bool>;
    /// Every ingredient row of every recipe in the user's shopping
    /// list, ordered by shopping list insertion and then by
    /// ingredient row, read in a single statement.
    async fn shopping_rows(&self, user_id: Id<UserMarker>) -> Result<Vec<RecipeIngredient>>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Returns `false` if the user already follows the author.
    async fn follow(&self, user_id: Id<UserMarker>, author_id: Id<UserMarker>) -> Result<bool>;
    /// Returns `false` if the user did not follow the author.
    async fn unfollow(&self, user_id: Id<UserMarker>, author_id: Id<UserMarker>) -> Result<bool>;
    async fn is_following(
        &self,
        user_id: Id<UserMarker>,
        author_id: Id<UserMarker>,
    ) -> Result<bool>;
    /// Authors followed by the user, in follow order.
    async fn followed_authors(
        &self,
        user_id: Id<UserMarker>,
        pagination: Pagination,
    ) -> Result<Paged<User>>;
}

pub trait Store: Send + Sync + 'static {
    fn users(&self) -> &dyn UserRepository;
    fn tags(&self) -> &dyn TagRepository;
    fn ingredients(&self) -> &dyn IngredientRepository;
    fn recipes(&self) -> &dyn RecipeRepository;
    fn memberships(&self) -> &dyn MembershipRepository;
    fn follows(&self) -> &dyn FollowRepository;
}
