use actix_web::{web, HttpRequest, HttpResponse};

use super::path_id;
use crate::http::routes::Endpoint;
use crate::http::util::respond;
use crate::http::Result;
use crate::services::ingredients::{GetIngredient, ListIngredients};
use crate::types::query::IngredientQuery;
use crate::App;

pub async fn list(app: web::Data<App>, req: HttpRequest) -> Result<HttpResponse> {
    let request = ListIngredients {
        query: IngredientQuery::parse(req.query_string()),
    };
    let ingredients = request.perform(&app).await?;
    Ok(respond(Endpoint::ListIngredients, &ingredients))
}

pub async fn get(app: web::Data<App>, id: web::Path<u64>) -> Result<HttpResponse> {
    let request = GetIngredient {
        id: path_id(id.into_inner())?,
    };
    let ingredient = request.perform(&app).await?;
    Ok(respond(Endpoint::GetIngredient, &ingredient))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App as ActixApp};
    use serde_json::Value;

    use crate::http::controllers::configure;
    use crate::test_utils;

    #[actix_web::test]
    async fn test_search_by_prefix() {
        let app = test_utils::app();
        for name in ["Sugar", "salt", "pepper"] {
            test_utils::create_ingredient(&app, name, "g").await;
        }

        let service = test::init_service(
            ActixApp::new()
                .app_data(web::Data::new(app))
                .configure(configure),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/api/ingredients?name=S")
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = test::read_body_json(response).await;
        let names = body
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["name"].as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["salt", "Sugar"]);
    }
}
