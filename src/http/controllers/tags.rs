use actix_web::{web, HttpResponse};

use super::path_id;
use crate::http::routes::Endpoint;
use crate::http::util::respond;
use crate::http::Result;
use crate::services::tags::{GetTag, ListTags};
use crate::App;

pub async fn list(app: web::Data<App>) -> Result<HttpResponse> {
    let tags = ListTags.perform(&app).await?;
    Ok(respond(Endpoint::ListTags, &tags))
}

pub async fn get(app: web::Data<App>, id: web::Path<u64>) -> Result<HttpResponse> {
    let request = GetTag {
        id: path_id(id.into_inner())?,
    };
    let tag = request.perform(&app).await?;
    Ok(respond(Endpoint::GetTag, &tag))
}
