mod ingredient;
mod membership;
mod recipe;
mod tag;
mod user;

pub use ingredient::{Ingredient, NewIngredient};
pub use membership::MembershipKind;
pub use recipe::{IngredientAmount, Recipe, RecipeIngredient};
pub use tag::Tag;
pub use user::{NewUser, User};
