//! JSON representations returned by the API.
use serde::Serialize;

use crate::schema::{Recipe, RecipeIngredient, Tag, User};

use super::id::{
    marker::{RecipeMarker, UserMarker},
    Id,
};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserView {
    pub id: Id<UserMarker>,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the current actor follows this user.
    pub is_subscribed: bool,
}

impl UserView {
    #[must_use]
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FollowedUserView {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<MinimalRecipeView>,
    pub recipes_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MinimalRecipeView {
    pub id: Id<RecipeMarker>,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<Recipe> for MinimalRecipeView {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeView {
    pub id: Id<RecipeMarker>,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::Token;

    #[test]
    fn test_minimal_recipe_tokens() {
        let view = MinimalRecipeView {
            id: Id::new(4),
            name: "Borscht".into(),
            image: "borscht.png".into(),
            cooking_time: 90,
        };

        serde_test::assert_ser_tokens(
            &view,
            &[
                Token::Struct {
                    name: "MinimalRecipeView",
                    len: 4,
                },
                Token::Str("id"),
                Token::U64(4),
                Token::Str("name"),
                Token::Str("Borscht"),
                Token::Str("image"),
                Token::Str("borscht.png"),
                Token::Str("cooking_time"),
                Token::I32(90),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn test_followed_user_is_flat() {
        let view = FollowedUserView {
            user: UserView {
                id: Id::new(2),
                email: "anna@foodgram.io".into(),
                username: "anna".into(),
                first_name: "Anna".into(),
                last_name: "Petrova".into(),
                is_subscribed: true,
            },
            recipes: Vec::new(),
            recipes_count: 0,
        };

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 2,
                "email": "anna@foodgram.io",
                "username": "anna",
                "first_name": "Anna",
                "last_name": "Petrova",
                "is_subscribed": true,
                "recipes": [],
                "recipes_count": 0,
            })
        );
    }
}
