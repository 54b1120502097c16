use actix_web::{
    error::PathError,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web::Bytes,
    HttpRequest, HttpResponse,
};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use super::{
    routes::{Endpoint, Output},
    Error,
};
use crate::store::Paged;
use crate::types::{Page, Pagination};

/// Builds a response with the success status declared for `endpoint`.
pub fn respond<T: Serialize>(endpoint: Endpoint, body: &T) -> HttpResponse {
    match endpoint.route().output {
        Output::Created => HttpResponse::Created().json(body),
        Output::NoContent => HttpResponse::NoContent().finish(),
        Output::Ok | Output::Attachment => HttpResponse::Ok().json(body),
    }
}

pub fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

pub fn attachment(filename: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(mime::TEXT_PLAIN_UTF_8)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename.to_string())],
        })
        .body(body)
}

fn page_link(req: &HttpRequest, page: u64) -> Option<String> {
    let info = req.connection_info();
    let base = format!("{}://{}{}", info.scheme(), info.host(), req.path());
    let mut url = Url::parse(&base).ok()?;

    let pairs = url::form_urlencoded::parse(req.query_string().as_bytes())
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect::<Vec<_>>();

    {
        let mut query = url.query_pairs_mut();
        query.extend_pairs(pairs);
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    Some(url.into())
}

/// Wraps `paged` into `{count, next, previous, results}` with absolute
/// links derived from the current request.
pub fn page<T>(req: &HttpRequest, pagination: Pagination, paged: Paged<T>) -> Page<T> {
    let current = pagination.page.get();
    let next = pagination
        .has_next(paged.total)
        .then(|| page_link(req, current + 1))
        .flatten();
    let previous = pagination
        .has_previous()
        .then(|| page_link(req, current - 1))
        .flatten();

    Page {
        count: paged.total,
        next,
        previous,
        results: paged.items,
    }
}

/// Decodes a JSON request body.
///
/// Handlers behind a session call this after authenticating, so an
/// anonymous request never gets past 401 regardless of its body.
pub fn json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Error> {
    serde_json::from_slice(body)
        .map_err(|err| Error::invalid_request(format!("Invalid JSON body: {err}")))
}

pub fn path_error_handler(_err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::not_found("Not found").into()
}
