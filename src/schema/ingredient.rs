use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::id::{marker::IngredientMarker, Id};

#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct Ingredient {
    pub id: Id<IngredientMarker>,
    pub name: String,
    pub measurement_unit: String,
}

/// Reference data loaded by `foodgram import-ingredients`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}
