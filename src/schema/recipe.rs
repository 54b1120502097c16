use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::types::id::{
    marker::{IngredientMarker, RecipeMarker, UserMarker},
    Id,
};

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Recipe {
    pub id: Id<RecipeMarker>,
    pub author_id: Id<UserMarker>,
    pub name: String,
    /// Reference to an externally stored image.
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub created_at: NaiveDateTime,
}

/// An ingredient joined with the amount one recipe needs of it.
///
/// The same row shape feeds both recipe rendering and the
/// shopping list aggregation.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub id: Id<IngredientMarker>,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: Id<IngredientMarker>,
    pub amount: i32,
}
