use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::types::id::{marker::UserMarker, Id};

/// Account row owned by the external authentication service.
///
/// Foodgram only reads users; [`NewUser`] exists for the operator CLI
/// and tests.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: Id<UserMarker>,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}
