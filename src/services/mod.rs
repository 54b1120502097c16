//! One struct per API operation.
//!
//! Each service holds the request input and exposes a `perform`
//! method taking the [`App`](crate::App) and, when needed, the session
//! user. Controllers only translate HTTP into these calls.
pub mod follows;
pub mod ingredients;
pub mod memberships;
pub mod recipes;
pub mod shopping;
pub mod tags;
pub mod users;
