use async_trait::async_trait;
use chrono::Utc;
use error_stack::Report;
use indexmap::IndexSet;
use std::collections::BTreeMap;
use std::num::NonZeroU64;
use tokio::sync::Mutex;

use super::{
    FollowRepository, IngredientRepository, MembershipRepository, Paged, RecipeDraft,
    RecipeFilter, RecipePatch, RecipeRepository, Store, TagRepository, UserRepository,
};
use crate::database::{Error as DbError, Result};
use crate::schema::{
    Ingredient, IngredientAmount, MembershipKind, NewIngredient, NewUser, Recipe,
    RecipeIngredient, Tag, User,
};
use crate::types::id::{
    marker::{IngredientMarker, Marker, RecipeMarker, TagMarker, UserMarker},
    Id,
};
use crate::types::Pagination;

type Pair<A, B> = (Id<A>, Id<B>);

#[derive(Debug)]
struct AmountRow {
    id: u64,
    recipe_id: Id<RecipeMarker>,
    amount: IngredientAmount,
}

/// Table-per-field mirror of the Postgres schema.
#[derive(Debug, Default)]
struct State {
    sequences: [u64; 5],
    users: BTreeMap<Id<UserMarker>, User>,
    tags: BTreeMap<Id<TagMarker>, Tag>,
    ingredients: BTreeMap<Id<IngredientMarker>, Ingredient>,
    recipes: BTreeMap<Id<RecipeMarker>, Recipe>,
    recipe_tags: BTreeMap<Id<RecipeMarker>, Vec<Id<TagMarker>>>,
    amounts: Vec<AmountRow>,
    favorites: IndexSet<Pair<UserMarker, RecipeMarker>>,
    shopping_list: IndexSet<Pair<UserMarker, RecipeMarker>>,
    follows: IndexSet<Pair<UserMarker, UserMarker>>,
}

#[derive(Clone, Copy)]
enum Sequence {
    Users,
    Tags,
    Ingredients,
    Recipes,
    Amounts,
}

impl State {
    fn next_raw(&mut self, sequence: Sequence) -> NonZeroU64 {
        let counter = &mut self.sequences[sequence as usize];
        *counter += 1;
        NonZeroU64::new(*counter).unwrap_or(NonZeroU64::MIN)
    }

    fn next_id<T: Marker>(&mut self, sequence: Sequence) -> Id<T> {
        Id::from_nonzero(self.next_raw(sequence))
    }

    fn memberships(&mut self, kind: MembershipKind) -> &mut IndexSet<Pair<UserMarker, RecipeMarker>> {
        match kind {
            MembershipKind::Favorite => &mut self.favorites,
            MembershipKind::ShoppingList => &mut self.shopping_list,
        }
    }

    fn insert_amounts(&mut self, recipe_id: Id<RecipeMarker>, amounts: &[IngredientAmount]) {
        for amount in amounts {
            let id = self.next_raw(Sequence::Amounts).get();
            self.amounts.push(AmountRow {
                id,
                recipe_id,
                amount: *amount,
            });
        }
    }

    fn recipe_ingredients(&self, recipe_id: Id<RecipeMarker>) -> Vec<RecipeIngredient> {
        let mut rows = self
            .amounts
            .iter()
            .filter(|row| row.recipe_id == recipe_id)
            .collect::<Vec<_>>();
        rows.sort_by_key(|row| row.id);

        rows.into_iter()
            .filter_map(|row| {
                let ingredient = self.ingredients.get(&row.amount.ingredient_id)?;
                Some(RecipeIngredient {
                    id: ingredient.id,
                    name: ingredient.name.clone(),
                    measurement_unit: ingredient.measurement_unit.clone(),
                    amount: row.amount.amount,
                })
            })
            .collect()
    }

    fn matches(&self, recipe: &Recipe, filter: &RecipeFilter) -> bool {
        if filter.author.is_some_and(|author| author != recipe.author_id) {
            return false;
        }
        if let Some(user) = filter.favorited_by {
            if !self.favorites.contains(&(user, recipe.id)) {
                return false;
            }
        }
        if let Some(user) = filter.in_shopping_list_of {
            if !self.shopping_list.contains(&(user, recipe.id)) {
                return false;
            }
        }
        if !filter.tags.is_empty() {
            let tags = self.recipe_tags.get(&recipe.id);
            let has_tag = tags.into_iter().flatten().any(|id| {
                self.tags
                    .get(id)
                    .is_some_and(|tag| filter.tags.contains(&tag.slug))
            });
            if !has_tag {
                return false;
            }
        }
        true
    }
}

fn paginate<T: Clone>(items: Vec<T>, pagination: Pagination) -> Paged<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(pagination.limit.get()).unwrap_or(usize::MAX);
    Paged {
        total,
        items: items.into_iter().skip(offset).take(limit).collect(),
    }
}

/// Process-local store behind a single [`tokio::sync::Mutex`].
///
/// Every operation locks the whole state so membership uniqueness and
/// recipe writes are atomic, mirroring the guarantees of [`PgStore`].
///
/// [`PgStore`]: super::PgStore
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the same tags as the initial migration.
    #[must_use]
    pub fn with_default_tags() -> Self {
        let mut state = State::default();
        for (name, color, slug) in [
            ("Breakfast", "#E26C2D", "breakfast"),
            ("Lunch", "#49B64E", "lunch"),
            ("Dinner", "#8775D2", "dinner"),
        ] {
            let id = state.next_id(Sequence::Tags);
            state.tags.insert(
                id,
                Tag {
                    id,
                    name: name.to_string(),
                    color: color.to_string(),
                    slug: slug.to_string(),
                },
            );
        }
        Self {
            state: Mutex::new(state),
        }
    }
}

impl Store for MemoryStore {
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

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Id<UserMarker>) -> Result<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        let mut state = self.state.lock().await;
        let id = state.next_id(Sequence::Users);
        let user = User {
            id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_admin: user.is_admin,
            created_at: Utc::now().naive_utc(),
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Tag>> {
        Ok(self.state.lock().await.tags.values().rev().cloned().collect())
    }

    async fn find_by_id(&self, id: Id<TagMarker>) -> Result<Option<Tag>> {
        Ok(self.state.lock().await.tags.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Id<TagMarker>]) -> Result<Vec<Tag>> {
        let state = self.state.lock().await;
        Ok(state
            .tags
            .values()
            .filter(|tag| ids.contains(&tag.id))
            .cloned()
            .collect())
    }

    async fn for_recipe(&self, recipe_id: Id<RecipeMarker>) -> Result<Vec<Tag>> {
        let state = self.state.lock().await;
        let Some(ids) = state.recipe_tags.get(&recipe_id) else {
            return Ok(Vec::new());
        };
        Ok(state
            .tags
            .values()
            .filter(|tag| ids.contains(&tag.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl IngredientRepository for MemoryStore {
    async fn find_by_filter(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>> {
        let prefix = name_prefix.map(str::to_lowercase);
        let state = self.state.lock().await;
        Ok(state
            .ingredients
            .values()
            .rev()
            .filter(|ingredient| match &prefix {
                Some(prefix) => ingredient.name.to_lowercase().starts_with(prefix.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Id<IngredientMarker>) -> Result<Option<Ingredient>> {
        Ok(self.state.lock().await.ingredients.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Id<IngredientMarker>]) -> Result<Vec<Ingredient>> {
        let state = self.state.lock().await;
        Ok(state
            .ingredients
            .values()
            .filter(|ingredient| ids.contains(&ingredient.id))
            .cloned()
            .collect())
    }

    async fn create_many(&self, ingredients: &[NewIngredient]) -> Result<u64> {
        let mut state = self.state.lock().await;
        for ingredient in ingredients {
            let id = state.next_id(Sequence::Ingredients);
            state.ingredients.insert(
                id,
                Ingredient {
                    id,
                    name: ingredient.name.clone(),
                    measurement_unit: ingredient.measurement_unit.clone(),
                },
            );
        }
        Ok(ingredients.len() as u64)
    }
}

#[async_trait]
impl RecipeRepository for MemoryStore {
    async fn find_by_id(&self, id: Id<RecipeMarker>) -> Result<Option<Recipe>> {
        Ok(self.state.lock().await.recipes.get(&id).cloned())
    }

    async fn find_by_filter(
        &self,
        filter: &RecipeFilter,
        pagination: Pagination,
    ) -> Result<Paged<Recipe>> {
        let state = self.state.lock().await;
        let recipes = state
            .recipes
            .values()
            .rev()
            .filter(|recipe| state.matches(recipe, filter))
            .cloned()
            .collect::<Vec<_>>();

        Ok(paginate(recipes, pagination))
    }

    async fn find_by_author(
        &self,
        author_id: Id<UserMarker>,
        limit: Option<u64>,
    ) -> Result<Paged<Recipe>> {
        let state = self.state.lock().await;
        let recipes = state
            .recipes
            .values()
            .rev()
            .filter(|recipe| recipe.author_id == author_id)
            .collect::<Vec<_>>();

        let limit = limit.map_or(usize::MAX, |v| usize::try_from(v).unwrap_or(usize::MAX));
        Ok(Paged {
            total: recipes.len() as u64,
            items: recipes.into_iter().take(limit).cloned().collect(),
        })
    }

    async fn ingredient_rows(&self, id: Id<RecipeMarker>) -> Result<Vec<RecipeIngredient>> {
        Ok(self.state.lock().await.recipe_ingredients(id))
    }

    async fn create(&self, draft: &RecipeDraft) -> Result<Recipe> {
        let mut state = self.state.lock().await;
        let id = state.next_id(Sequence::Recipes);
        let recipe = Recipe {
            id,
            author_id: draft.author_id,
            name: draft.name.clone(),
            image: draft.image.clone(),
            text: draft.text.clone(),
            cooking_time: draft.cooking_time,
            created_at: Utc::now().naive_utc(),
        };

        state.recipes.insert(id, recipe.clone());
        state.recipe_tags.insert(id, draft.tags.clone());
        state.insert_amounts(id, &draft.ingredients);
        Ok(recipe)
    }

    async fn update(&self, id: Id<RecipeMarker>, patch: &RecipePatch) -> Result<Option<Recipe>> {
        let mut state = self.state.lock().await;
        let Some(recipe) = state.recipes.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            recipe.name = name.clone();
        }
        if let Some(image) = &patch.image {
            recipe.image = image.clone();
        }
        if let Some(text) = &patch.text {
            recipe.text = text.clone();
        }
        if let Some(cooking_time) = patch.cooking_time {
            recipe.cooking_time = cooking_time;
        }
        let recipe = recipe.clone();

        if let Some(tags) = &patch.tags {
            state.recipe_tags.insert(id, tags.clone());
        }
        if let Some(ingredients) = &patch.ingredients {
            state.amounts.retain(|row| row.recipe_id != id);
            state.insert_amounts(id, ingredients);
        }
        Ok(Some(recipe))
    }

    async fn delete(&self, id: Id<RecipeMarker>) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.recipes.remove(&id).is_none() {
            return Ok(false);
        }

        state.recipe_tags.remove(&id);
        state.amounts.retain(|row| row.recipe_id != id);
        state.favorites.retain(|(_, recipe)| *recipe != id);
        state.shopping_list.retain(|(_, recipe)| *recipe != id);
        Ok(true)
    }
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn add(
        &self,
        kind: MembershipKind,
        user_id: Id<UserMarker>,
        recipe_id: Id<RecipeMarker>,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        if !state.recipes.contains_key(&recipe_id) {
            return Err(Report::new(DbError::MissingReference));
        }
        Ok(state.memberships(kind).insert((user_id, recipe_id)))
    }

    async fn remove(
        &self,
        kind: MembershipKind,
        user_id: Id<UserMarker>,
        recipe_id: Id<RecipeMarker>,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        Ok(state.memberships(kind).shift_remove(&(user_id, recipe_id)))
    }

    async fn contains(
        &self,
        kind: MembershipKind,
        user_id: Id<UserMarker>,
        recipe_id: Id<RecipeMarker>,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        Ok(state.memberships(kind).contains(&(user_id, recipe_id)))
    }

    async fn shopping_rows(&self, user_id: Id<UserMarker>) -> Result<Vec<RecipeIngredient>> {
        let state = self.state.lock().await;
        Ok(state
            .shopping_list
            .iter()
            .filter(|(user, _)| *user == user_id)
            .flat_map(|(_, recipe_id)| state.recipe_ingredients(*recipe_id))
            .collect())
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn follow(&self, user_id: Id<UserMarker>, author_id: Id<UserMarker>) -> Result<bool> {
        Ok(self.state.lock().await.follows.insert((user_id, author_id)))
    }

    async fn unfollow(&self, user_id: Id<UserMarker>, author_id: Id<UserMarker>) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .await
            .follows
            .shift_remove(&(user_id, author_id)))
    }

    async fn is_following(
        &self,
        user_id: Id<UserMarker>,
        author_id: Id<UserMarker>,
    ) -> Result<bool> {
        Ok(self.state.lock().await.follows.contains(&(user_id, author_id)))
    }

    async fn followed_authors(
        &self,
        user_id: Id<UserMarker>,
        pagination: Pagination,
    ) -> Result<Paged<User>> {
        let state = self.state.lock().await;
        let authors = state
            .follows
            .iter()
            .filter(|(user, _)| *user == user_id)
            .filter_map(|(_, author)| state.users.get(author).cloned())
            .collect::<Vec<_>>();

        Ok(paginate(authors, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ErrorExt2;

    fn draft(author_id: Id<UserMarker>, ingredients: &[(u64, i32)]) -> RecipeDraft {
        RecipeDraft {
            author_id,
            ingredients: ingredients
                .iter()
                .map(|(id, amount)| IngredientAmount {
                    ingredient_id: Id::new(*id),
                    amount: *amount,
                })
                .collect(),
            tags: vec![Id::new(1)],
            image: "image.png".into(),
            name: "Soup".into(),
            text: "Boil it.".into(),
            cooking_time: 30,
        }
    }

    #[tokio::test]
    async fn test_membership_uniqueness() {
        let store = MemoryStore::with_default_tags();
        let user = Id::new(1);
        let recipe = store.recipes().create(&draft(user, &[])).await.unwrap().id;

        let memberships = store.memberships();
        assert!(memberships.add(MembershipKind::Favorite, user, recipe).await.unwrap());
        assert!(!memberships.add(MembershipKind::Favorite, user, recipe).await.unwrap());
        assert!(memberships
            .add(MembershipKind::ShoppingList, user, recipe)
            .await
            .unwrap());

        assert!(memberships.remove(MembershipKind::Favorite, user, recipe).await.unwrap());
        assert!(!memberships.remove(MembershipKind::Favorite, user, recipe).await.unwrap());
        assert!(memberships
            .contains(MembershipKind::ShoppingList, user, recipe)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_membership_of_missing_recipe() {
        let store = MemoryStore::new();
        let report = store
            .memberships()
            .add(MembershipKind::Favorite, Id::new(1), Id::new(2))
            .await
            .unwrap_err();
        assert!(report.is_missing_reference());
    }

    #[tokio::test]
    async fn test_delete_recipe_cascades() {
        let store = MemoryStore::with_default_tags();
        let recipes = store.recipes();
        let recipe = recipes.create(&draft(Id::new(1), &[(1, 2)])).await.unwrap();
        store
            .memberships()
            .add(MembershipKind::ShoppingList, Id::new(5), recipe.id)
            .await
            .unwrap();

        assert!(recipes.delete(recipe.id).await.unwrap());
        assert!(!recipes.delete(recipe.id).await.unwrap());
        assert!(store.memberships().shopping_rows(Id::new(5)).await.unwrap().is_empty());
        assert!(store.tags().for_recipe(recipe.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filters_and_order() {
        let store = MemoryStore::with_default_tags();
        let recipes = store.recipes();
        let first = recipes.create(&draft(Id::new(1), &[])).await.unwrap();
        let mut lunch = draft(Id::new(2), &[]);
        lunch.tags = vec![Id::new(2)];
        let second = recipes.create(&lunch).await.unwrap();

        let all = recipes
            .find_by_filter(&RecipeFilter::default(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.items[0].id, second.id);
        assert_eq!(all.items[1].id, first.id);

        let filter = RecipeFilter {
            tags: vec!["breakfast".into(), "dinner".into()],
            ..Default::default()
        };
        let found = recipes.find_by_filter(&filter, Pagination::default()).await.unwrap();
        assert_eq!(found.items, vec![first.clone()]);

        let filter = RecipeFilter {
            author: Some(Id::new(2)),
            ..Default::default()
        };
        let found = recipes.find_by_filter(&filter, Pagination::default()).await.unwrap();
        assert_eq!(found.items, vec![second]);
    }

    #[tokio::test]
    async fn test_ingredient_prefix_search() {
        let store = MemoryStore::new();
        let ingredients = store.ingredients();
        ingredients
            .create_many(&[
                NewIngredient {
                    name: "Milk".into(),
                    measurement_unit: "ml".into(),
                },
                NewIngredient {
                    name: "millet".into(),
                    measurement_unit: "g".into(),
                },
                NewIngredient {
                    name: "Salt".into(),
                    measurement_unit: "g".into(),
                },
            ])
            .await
            .unwrap();

        let found = ingredients.find_by_filter(Some("MIL")).await.unwrap();
        let names = found.iter().map(|v| v.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["millet", "Milk"]);
        assert_eq!(ingredients.find_by_filter(None).await.unwrap().len(), 3);
    }
}
