use serde::Serialize;
use sqlx::FromRow;

use crate::types::id::{marker::TagMarker, Id};

#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct Tag {
    pub id: Id<TagMarker>,
    pub name: String,
    /// Hex color in `#RRGGBB` form.
    pub color: String,
    pub slug: String,
}
