//! Per-endpoint configuration table.
//!
//! Routing, authorization and success status codes are all read from
//! [`ROUTES`] so an endpoint's policy lives in exactly one place.
use actix_web::http::Method;

use crate::schema::User;
use crate::types::id::{marker::UserMarker, Id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListTags,
    GetTag,
    ListIngredients,
    GetIngredient,
    ListRecipes,
    CreateRecipe,
    DownloadShoppingCart,
    GetRecipe,
    UpdateRecipe,
    DeleteRecipe,
    AddFavorite,
    RemoveFavorite,
    AddToShoppingCart,
    RemoveFromShoppingCart,
    CurrentUser,
    ListSubscriptions,
    GetUser,
    Follow,
    Unfollow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Patch,
    Delete,
}

impl Verb {
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Patch => Method::PATCH,
            Self::Delete => Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    /// Authenticated, and the actor must own the resource or be an admin.
    OwnerOrAdmin,
}

impl Access {
    #[must_use]
    pub const fn requires_session(self) -> bool {
        !matches!(self, Self::Public)
    }

    #[must_use]
    pub fn permits(self, user: Option<&User>, owner: Id<UserMarker>) -> bool {
        match (self, user) {
            (Self::Public, _) => true,
            (Self::Authenticated, user) => user.is_some(),
            (Self::OwnerOrAdmin, Some(user)) => user.is_admin || user.id == owner,
            (Self::OwnerOrAdmin, None) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Ok,
    Created,
    NoContent,
    /// `text/plain` file download.
    Attachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub endpoint: Endpoint,
    pub verb: Verb,
    /// Path relative to the `/api` scope.
    pub path: &'static str,
    pub access: Access,
    pub output: Output,
}

const fn route(
    endpoint: Endpoint,
    verb: Verb,
    path: &'static str,
    access: Access,
    output: Output,
) -> Route {
    Route {
        endpoint,
        verb,
        path,
        access,
        output,
    }
}

/// Indexed by [`Endpoint`]; fixed paths precede the `{id}` patterns
/// they would otherwise be shadowed by.
pub const ROUTES: [Route; 19] = {
    use Access::*;
    use Endpoint::*;
    use Verb::*;

    [
        route(ListTags, Get, "/tags", Public, Output::Ok),
        route(GetTag, Get, "/tags/{id}", Public, Output::Ok),
        route(ListIngredients, Get, "/ingredients", Public, Output::Ok),
        route(GetIngredient, Get, "/ingredients/{id}", Public, Output::Ok),
        route(ListRecipes, Get, "/recipes", Public, Output::Ok),
        route(CreateRecipe, Post, "/recipes", Authenticated, Output::Created),
        route(
            DownloadShoppingCart,
            Get,
            "/recipes/download_shopping_cart",
            Authenticated,
            Output::Attachment,
        ),
        route(GetRecipe, Get, "/recipes/{id}", Public, Output::Ok),
        route(UpdateRecipe, Patch, "/recipes/{id}", OwnerOrAdmin, Output::Ok),
        route(DeleteRecipe, Delete, "/recipes/{id}", OwnerOrAdmin, Output::NoContent),
        route(AddFavorite, Post, "/recipes/{id}/favorite", Authenticated, Output::Created),
        route(RemoveFavorite, Delete, "/recipes/{id}/favorite", Authenticated, Output::NoContent),
        route(
            AddToShoppingCart,
            Post,
            "/recipes/{id}/shopping_cart",
            Authenticated,
            Output::Created,
        ),
        route(
            RemoveFromShoppingCart,
            Delete,
            "/recipes/{id}/shopping_cart",
            Authenticated,
            Output::NoContent,
        ),
        route(CurrentUser, Get, "/users/me", Authenticated, Output::Ok),
        route(ListSubscriptions, Get, "/users/subscriptions", Authenticated, Output::Ok),
        route(GetUser, Get, "/users/{id}", Public, Output::Ok),
        route(Follow, Post, "/users/{id}/subscribe", Authenticated, Output::Created),
        route(Unfollow, Delete, "/users/{id}/subscribe", Authenticated, Output::NoContent),
    ]
};

impl Endpoint {
    #[must_use]
    pub fn route(self) -> &'static Route {
        &ROUTES[self as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_table_is_indexed_by_endpoint() {
        for (index, route) in ROUTES.iter().enumerate() {
            assert_eq!(route.endpoint as usize, index, "{route:?}");
            assert_eq!(route.endpoint.route(), route);
        }
    }

    #[test]
    fn test_fixed_paths_come_first() {
        let position = |path: &str| ROUTES.iter().position(|r| r.path == path).unwrap();
        assert!(position("/recipes/download_shopping_cart") < position("/recipes/{id}"));
        assert!(position("/users/me") < position("/users/{id}"));
        assert!(position("/users/subscriptions") < position("/users/{id}"));
    }

    #[test]
    fn test_access_permits() {
        let owner = test_utils::user(1, false);
        let stranger = test_utils::user(2, false);
        let admin = test_utils::user(3, true);

        let access = Endpoint::UpdateRecipe.route().access;
        assert!(access.permits(Some(&owner), owner.id));
        assert!(!access.permits(Some(&stranger), owner.id));
        assert!(access.permits(Some(&admin), owner.id));
        assert!(!access.permits(None, owner.id));

        assert!(Access::Public.permits(None, owner.id));
        assert!(!Access::Authenticated.permits(None, owner.id));
    }
}
