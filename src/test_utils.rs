use chrono::Utc;
use std::net::{IpAddr, Ipv4Addr};

use crate::config::{self, Auth, Logging, Shopping};
use crate::http::Jwt;
use crate::schema::{Ingredient, NewIngredient, NewUser, Recipe, User};
use crate::store::RecipeDraft;
use crate::types::id::{
    marker::{IngredientMarker, UserMarker},
    Id,
};
use crate::util::Sensitive;
use crate::App;

pub const FOOTER: &str = "Foodgram | shopping list";

pub fn config() -> config::Server {
    config::Server {
        address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 8000,
        workers: None,
        db: None,
        auth: Auth {
            jwt_secret: Sensitive::new(String::from("test jwt secret key")),
            token_ttl_secs: 3600,
        },
        logging: Logging::default(),
        shopping: Shopping {
            footer: FOOTER.to_string(),
            filename: String::from("wishlist.txt"),
        },
    }
}

pub fn app() -> App {
    App::in_memory(config())
}

/// Detached user value for tests that never touch the store.
pub fn user(id: u64, is_admin: bool) -> User {
    User {
        id: Id::new(id),
        email: format!("user{id}@foodgram.io"),
        username: format!("user{id}"),
        first_name: String::from("Test"),
        last_name: format!("User {id}"),
        is_admin,
        created_at: Utc::now().naive_utc(),
    }
}

pub async fn create_user(app: &App, username: &str, is_admin: bool) -> User {
    app.store()
        .users()
        .create(&NewUser {
            email: format!("{username}@foodgram.io"),
            username: username.to_string(),
            first_name: username.to_string(),
            last_name: String::from("Tester"),
            is_admin,
        })
        .await
        .unwrap()
}

pub async fn create_ingredient(app: &App, name: &str, unit: &str) -> Ingredient {
    let ingredients = app.store().ingredients();
    ingredients
        .create_many(&[NewIngredient {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        }])
        .await
        .unwrap();

    ingredients
        .find_by_filter(None)
        .await
        .unwrap()
        .into_iter()
        .next()
        .unwrap()
}

pub async fn create_recipe(
    app: &App,
    author_id: Id<UserMarker>,
    name: &str,
    ingredients: &[(Id<IngredientMarker>, i32)],
) -> Recipe {
    app.store()
        .recipes()
        .create(&RecipeDraft {
            author_id,
            ingredients: ingredients
                .iter()
                .map(|(ingredient_id, amount)| crate::schema::IngredientAmount {
                    ingredient_id: *ingredient_id,
                    amount: *amount,
                })
                .collect(),
            tags: vec![Id::new(1)],
            image: format!("https://cdn.foodgram.io/{name}.png"),
            name: name.to_string(),
            text: String::from("Cook it well."),
            cooking_time: 15,
        })
        .await
        .unwrap()
}

pub fn token(app: &App, user: &User) -> String {
    Jwt::new(user.id, app.config.auth.token_ttl_secs)
        .encode(&app.config.auth)
        .unwrap()
}

pub fn bearer(app: &App, user: &User) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token(app, user)))
}
