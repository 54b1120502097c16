use actix_web::{web, HttpRequest, HttpResponse};

use super::path_id;
use crate::http::routes::Endpoint;
use crate::http::util::{no_content, page, respond};
use crate::http::{Actor, Result};
use crate::services::follows::{FollowUser, ListFollows, UnfollowUser};
use crate::services::users::{CurrentUser, GetUser};
use crate::types::query::SubscriptionsQuery;
use crate::App;

pub async fn me(app: web::Data<App>, actor: Actor) -> Result<HttpResponse> {
    let user = actor.authenticate(Endpoint::CurrentUser)?;
    let view = CurrentUser.perform(&app, user).await?;
    Ok(respond(Endpoint::CurrentUser, &view))
}

pub async fn get(app: web::Data<App>, actor: Actor, id: web::Path<u64>) -> Result<HttpResponse> {
    let viewer = actor.authorize(Endpoint::GetUser)?;
    let request = GetUser {
        id: path_id(id.into_inner())?,
    };

    let view = request.perform(&app, viewer.as_ref()).await?;
    Ok(respond(Endpoint::GetUser, &view))
}

pub async fn subscriptions(
    app: web::Data<App>,
    actor: Actor,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = actor.authenticate(Endpoint::ListSubscriptions)?;
    let query = SubscriptionsQuery::parse(req.query_string())?;
    let pagination = query.pagination;

    let follows = ListFollows { query }.perform(&app, &user).await?;
    Ok(respond(
        Endpoint::ListSubscriptions,
        &page(&req, pagination, follows),
    ))
}

pub async fn follow(app: web::Data<App>, actor: Actor, id: web::Path<u64>) -> Result<HttpResponse> {
    let user = actor.authenticate(Endpoint::Follow)?;
    let request = FollowUser {
        target: path_id(id.into_inner())?,
    };

    let view = request.perform(&app, &user).await?;
    Ok(respond(Endpoint::Follow, &view))
}

pub async fn unfollow(
    app: web::Data<App>,
    actor: Actor,
    id: web::Path<u64>,
) -> Result<HttpResponse> {
    let user = actor.authenticate(Endpoint::Unfollow)?;
    let request = UnfollowUser {
        target: path_id(id.into_inner())?,
    };

    request.perform(&app, &user).await?;
    Ok(no_content())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App as ActixApp};
    use serde_json::{json, Value};

    use crate::http::controllers::configure;
    use crate::test_utils;

    #[actix_web::test]
    async fn test_subscribe_flow() {
        let app = test_utils::app();
        let alice = test_utils::create_user(&app, "alice", false).await;
        let bob = test_utils::create_user(&app, "bob", false).await;
        test_utils::create_recipe(&app, bob.id, "stew", &[]).await;
        let auth = test_utils::bearer(&app, &alice);

        let service = test::init_service(
            ActixApp::new()
                .app_data(web::Data::new(app))
                .configure(configure),
        )
        .await;

        let request = test::TestRequest::post()
            .uri(&format!("/api/users/{}/subscribe", alice.id))
            .insert_header(auth.clone())
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = test::TestRequest::post()
            .uri(&format!("/api/users/{}/subscribe", bob.id))
            .insert_header(auth.clone())
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["username"], "bob");
        assert_eq!(body["is_subscribed"], true);
        assert_eq!(body["recipes_count"], 1);

        let request = test::TestRequest::get()
            .uri("/api/users/subscriptions")
            .insert_header(auth.clone())
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["results"][0]["recipes"][0]["name"], json!("stew"));

        let request = test::TestRequest::get()
            .uri("/api/users/me")
            .insert_header(auth.clone())
            .to_request();
        let response = test::call_service(&service, request).await;
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["username"], "alice");
        assert_eq!(body["is_subscribed"], false);

        let request = test::TestRequest::delete()
            .uri(&format!("/api/users/{}/subscribe", bob.id))
            .insert_header(auth.clone())
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let request = test::TestRequest::delete()
            .uri(&format!("/api/users/{}/subscribe", bob.id))
            .insert_header(auth)
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
