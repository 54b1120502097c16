use actix_web::{web, HttpRequest, HttpResponse};

use super::path_id;
use crate::http::routes::Endpoint;
use crate::http::util::{attachment, json_body, no_content, page, respond};
use crate::http::{Actor, Result};
use crate::schema::MembershipKind;
use crate::services::memberships::{AddMembership, RemoveMembership};
use crate::services::recipes::{CreateRecipe, DeleteRecipe, GetRecipe, ListRecipes, UpdateRecipe};
use crate::services::shopping::DownloadShoppingCart;
use crate::types::form::recipes::{
    CreateRecipe as CreateRecipeForm, UpdateRecipe as UpdateRecipeForm,
};
use crate::types::query::RecipeQuery;
use crate::App;

pub async fn list(app: web::Data<App>, actor: Actor, req: HttpRequest) -> Result<HttpResponse> {
    let viewer = actor.authorize(Endpoint::ListRecipes)?;
    let query = RecipeQuery::parse(req.query_string())?;
    let pagination = query.pagination;

    let recipes = ListRecipes { query }.perform(&app, viewer.as_ref()).await?;
    Ok(respond(Endpoint::ListRecipes, &page(&req, pagination, recipes)))
}

pub async fn create(
    app: web::Data<App>,
    actor: Actor,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let user = actor.authenticate(Endpoint::CreateRecipe)?;
    let request = CreateRecipe {
        form: json_body::<CreateRecipeForm>(&body)?,
    };

    let recipe = request.perform(&app, &user).await?;
    Ok(respond(Endpoint::CreateRecipe, &recipe))
}

pub async fn get(app: web::Data<App>, actor: Actor, id: web::Path<u64>) -> Result<HttpResponse> {
    let viewer = actor.authorize(Endpoint::GetRecipe)?;
    let request = GetRecipe {
        id: path_id(id.into_inner())?,
    };

    let recipe = request.perform(&app, viewer.as_ref()).await?;
    Ok(respond(Endpoint::GetRecipe, &recipe))
}

pub async fn update(
    app: web::Data<App>,
    actor: Actor,
    id: web::Path<u64>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let user = actor.authenticate(Endpoint::UpdateRecipe)?;
    let request = UpdateRecipe {
        id: path_id(id.into_inner())?,
        form: json_body::<UpdateRecipeForm>(&body)?,
    };

    let recipe = request.perform(&app, &user).await?;
    Ok(respond(Endpoint::UpdateRecipe, &recipe))
}

pub async fn delete(app: web::Data<App>, actor: Actor, id: web::Path<u64>) -> Result<HttpResponse> {
    let user = actor.authenticate(Endpoint::DeleteRecipe)?;
    let request = DeleteRecipe {
        id: path_id(id.into_inner())?,
    };

    request.perform(&app, &user).await?;
    Ok(no_content())
}

pub async fn download_shopping_cart(app: web::Data<App>, actor: Actor) -> Result<HttpResponse> {
    let user = actor.authenticate(Endpoint::DownloadShoppingCart)?;
    let report = DownloadShoppingCart.perform(&app, &user).await?;
    Ok(attachment(&app.config.shopping.filename, report.text()))
}

async fn add_membership(
    app: &App,
    actor: Actor,
    endpoint: Endpoint,
    kind: MembershipKind,
    id: u64,
) -> Result<HttpResponse> {
    let user = actor.authenticate(endpoint)?;
    let request = AddMembership {
        kind,
        recipe_id: path_id(id)?,
    };

    let recipe = request.perform(app, &user).await?;
    Ok(respond(endpoint, &recipe))
}

async fn remove_membership(
    app: &App,
    actor: Actor,
    endpoint: Endpoint,
    kind: MembershipKind,
    id: u64,
) -> Result<HttpResponse> {
    let user = actor.authenticate(endpoint)?;
    let request = RemoveMembership {
        kind,
        recipe_id: path_id(id)?,
    };

    request.perform(app, &user).await?;
    Ok(no_content())
}

pub async fn add_favorite(
    app: web::Data<App>,
    actor: Actor,
    id: web::Path<u64>,
) -> Result<HttpResponse> {
    let endpoint = Endpoint::AddFavorite;
    add_membership(&app, actor, endpoint, MembershipKind::Favorite, id.into_inner()).await
}

pub async fn remove_favorite(
    app: web::Data<App>,
    actor: Actor,
    id: web::Path<u64>,
) -> Result<HttpResponse> {
    let endpoint = Endpoint::RemoveFavorite;
    remove_membership(&app, actor, endpoint, MembershipKind::Favorite, id.into_inner()).await
}

pub async fn add_to_shopping_cart(
    app: web::Data<App>,
    actor: Actor,
    id: web::Path<u64>,
) -> Result<HttpResponse> {
    let endpoint = Endpoint::AddToShoppingCart;
    add_membership(&app, actor, endpoint, MembershipKind::ShoppingList, id.into_inner()).await
}

pub async fn remove_from_shopping_cart(
    app: web::Data<App>,
    actor: Actor,
    id: web::Path<u64>,
) -> Result<HttpResponse> {
    let endpoint = Endpoint::RemoveFromShoppingCart;
    remove_membership(&app, actor, endpoint, MembershipKind::ShoppingList, id.into_inner()).await
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, middleware::NormalizePath, test, web, App as ActixApp};
    use serde_json::{json, Value};

    use crate::http::controllers::configure;
    use crate::test_utils;

    macro_rules! service {
        ($app:expr) => {
            test::init_service(
                ActixApp::new()
                    .app_data(web::Data::new($app))
                    .wrap(NormalizePath::trim())
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_create_and_download_shopping_cart() {
        let app = test_utils::app();
        let alice = test_utils::create_user(&app, "alice", false).await;
        let flour = test_utils::create_ingredient(&app, "flour", "g").await;
        let milk = test_utils::create_ingredient(&app, "milk", "ml").await;
        let auth = test_utils::bearer(&app, &alice);
        let service = service!(app);

        let mut ids = Vec::new();
        for (name, flour_amount) in [("pancakes", 200), ("crepes", 150)] {
            let request = test::TestRequest::post()
                .uri("/api/recipes")
                .insert_header(auth.clone())
                .set_json(json!({
                    "ingredients": [
                        { "id": flour.id, "amount": flour_amount },
                        { "id": milk.id, "amount": 250 },
                    ],
                    "tags": [1],
                    "image": "https://cdn.foodgram.io/pancakes.png",
                    "name": name,
                    "text": "Mix and fry.",
                    "cooking_time": 20,
                }))
                .to_request();
            let response = test::call_service(&service, request).await;
            assert_eq!(response.status(), StatusCode::CREATED);

            let body: Value = test::read_body_json(response).await;
            assert_eq!(body["name"], name);
            assert_eq!(body["author"]["username"], "alice");
            ids.push(body["id"].as_u64().unwrap());
        }

        for id in &ids {
            let request = test::TestRequest::post()
                .uri(&format!("/api/recipes/{id}/shopping_cart"))
                .insert_header(auth.clone())
                .to_request();
            let response = test::call_service(&service, request).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let request = test::TestRequest::post()
            .uri(&format!("/api/recipes/{}/shopping_cart", ids[0]))
            .insert_header(auth.clone())
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = test::TestRequest::get()
            .uri("/api/recipes/download_shopping_cart")
            .insert_header(auth.clone())
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-disposition").unwrap(),
            r#"attachment; filename="wishlist.txt""#
        );

        let body = test::read_body(response).await;
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            format!("flour - 350 g\nmilk - 500 ml\n\n{}", test_utils::FOOTER)
        );
    }

    #[actix_web::test]
    async fn test_invalid_body_lists_field_errors() {
        let app = test_utils::app();
        let alice = test_utils::create_user(&app, "alice", false).await;
        let salt = test_utils::create_ingredient(&app, "salt", "g").await;
        let auth = test_utils::bearer(&app, &alice);
        let service = service!(app);

        let request = test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header(auth.clone())
            .set_json(json!({
                "ingredients": [{ "id": salt.id, "amount": 1 }],
                "tags": [1],
                "image": "salt.png",
                "name": "Salt",
                "text": "Just salt.",
                "cooking_time": 0,
            }))
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["type"], "invalid_form_body");
        assert_eq!(
            body["errors"]["cooking_time"]["_errors"][0],
            "Cooking time must be at least 1 minute"
        );

        let request = test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header(auth)
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\": ")
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["type"], "invalid_request");
    }

    #[actix_web::test]
    async fn test_owner_or_admin() {
        let app = test_utils::app();
        let alice = test_utils::create_user(&app, "alice", false).await;
        let bob = test_utils::create_user(&app, "bob", false).await;
        let recipe = test_utils::create_recipe(&app, alice.id, "soup", &[]).await;
        let alice_auth = test_utils::bearer(&app, &alice);
        let bob_auth = test_utils::bearer(&app, &bob);
        let service = service!(app);

        let uri = format!("/api/recipes/{}", recipe.id);
        let request = test::TestRequest::patch()
            .uri(&uri)
            .insert_header(bob_auth.clone())
            .set_json(json!({ "name": "Bob's soup" }))
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let request = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bob_auth)
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let request = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(alice_auth)
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let request = test::TestRequest::get().uri(&uri).to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_pagination_links() {
        let app = test_utils::app();
        let alice = test_utils::create_user(&app, "alice", false).await;
        for name in ["soup", "salad", "pie"] {
            test_utils::create_recipe(&app, alice.id, name, &[]).await;
        }
        let service = service!(app);

        let request = test::TestRequest::get()
            .uri("/api/recipes?limit=2")
            .insert_header(("host", "foodgram.io"))
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["results"][0]["name"], "pie");
        assert_eq!(body["next"], "http://foodgram.io/api/recipes?limit=2&page=2");
        assert_eq!(body["previous"], Value::Null);
    }
}
