//! HTTP handlers of the `/api` scope.
//!
//! Handlers only translate between HTTP and services; routing is
//! derived from [`ROUTES`] so every endpoint is registered with the
//! path and method declared there.
use actix_web::{web, HttpResponse};

use super::routes::{Endpoint, ROUTES};
use super::util::path_error_handler;
use super::{Error, Result};
use crate::types::id::{marker::Marker, Id};

pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

/// Ids are parsed as plain integers first so `0` ends up as a 404
/// like any other unknown id.
pub(crate) fn path_id<T: Marker>(value: u64) -> Result<Id<T>> {
    Id::new_checked(value).ok_or_else(|| Error::not_found("Not found"))
}

fn handler(endpoint: Endpoint) -> actix_web::Route {
    let route = web::method(endpoint.route().verb.method());
    match endpoint {
        Endpoint::ListTags => route.to(tags::list),
        Endpoint::GetTag => route.to(tags::get),
        Endpoint::ListIngredients => route.to(ingredients::list),
        Endpoint::GetIngredient => route.to(ingredients::get),
        Endpoint::ListRecipes => route.to(recipes::list),
        Endpoint::CreateRecipe => route.to(recipes::create),
        Endpoint::DownloadShoppingCart => route.to(recipes::download_shopping_cart),
        Endpoint::GetRecipe => route.to(recipes::get),
        Endpoint::UpdateRecipe => route.to(recipes::update),
        Endpoint::DeleteRecipe => route.to(recipes::delete),
        Endpoint::AddFavorite => route.to(recipes::add_favorite),
        Endpoint::RemoveFavorite => route.to(recipes::remove_favorite),
        Endpoint::AddToShoppingCart => route.to(recipes::add_to_shopping_cart),
        Endpoint::RemoveFromShoppingCart => route.to(recipes::remove_from_shopping_cart),
        Endpoint::CurrentUser => route.to(users::me),
        Endpoint::ListSubscriptions => route.to(users::subscriptions),
        Endpoint::GetUser => route.to(users::get),
        Endpoint::Follow => route.to(users::follow),
        Endpoint::Unfollow => route.to(users::unfollow),
    }
}

async fn not_found() -> Result<HttpResponse> {
    Err(Error::not_found("Not found"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Resources are registered in table order, one per distinct path
    let mut paths: Vec<&'static str> = Vec::new();
    for route in &ROUTES {
        if !paths.contains(&route.path) {
            paths.push(route.path);
        }
    }

    let mut scope = web::scope("/api").app_data(web::PathConfig::default().error_handler(path_error_handler));

    for path in paths {
        let mut resource = web::resource(path);
        for route in ROUTES.iter().filter(|route| route.path == path) {
            resource = resource.route(handler(route.endpoint));
        }
        scope = scope.service(resource);
    }

    cfg.service(scope.default_service(web::to(not_found)));
}
