use actix_web::{http::header, web, FromRequest};
use futures::future::{ready, LocalBoxFuture};
use thiserror::Error;

use crate::{schema::User, App};

use super::{routes::Endpoint, Error, Jwt};

/// Whoever sent the request, resolved from the bearer token.
#[derive(Debug, Clone)]
pub enum Actor {
    Anonymous,
    User(User),
}

impl Actor {
    /// Applies the access policy of `endpoint`, returning the session
    /// user if there is one.
    pub fn authorize(self, endpoint: Endpoint) -> Result<Option<User>, Error> {
        #[derive(Debug, Error)]
        #[error("Attempt to access user-only route")]
        struct Unauthorized;

        match self {
            Self::User(user) => Ok(Some(user)),
            Self::Anonymous if endpoint.route().access.requires_session() => Err(
                Error::from_context(crate::types::Error::Unauthorized, Unauthorized),
            ),
            Self::Anonymous => Ok(None),
        }
    }

    /// Same as [`Actor::authorize`] for endpoints that always need a session.
    pub fn authenticate(self, endpoint: Endpoint) -> Result<User, Error> {
        self.authorize(endpoint)?.ok_or_else(Error::unauthorized)
    }
}

impl FromRequest for Actor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let header = req.headers().get(header::AUTHORIZATION);
        let Some(header) = header else {
            return Box::pin(ready(Ok(Actor::Anonymous)));
        };

        let Some(token) = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
        else {
            return Box::pin(ready(Err(Error::unauthorized()
                .attach_printable("malformed authorization header"))));
        };

        let Some(app) = req.app_data::<web::Data<App>>() else {
            #[derive(Debug, Error)]
            #[error("The web app has no available configuration")]
            struct NoConfig;
            return Box::pin(ready(Err(Error::from_context(
                crate::types::Error::Internal,
                NoConfig,
            ))));
        };

        let jwt = match Jwt::decode(token.trim(), &app.config.auth) {
            Ok(jwt) => jwt,
            Err(report) => {
                return Box::pin(ready(Err(Error::from_report(
                    crate::types::Error::Unauthorized,
                    report,
                ))))
            }
        };

        let app = app.clone();
        Box::pin(async move {
            match app.store().users().find_by_id(jwt.user_id).await? {
                Some(user) => Ok(Actor::User(user)),
                None => Err(Error::unauthorized().attach_printable("token refers to unknown user")),
            }
        })
    }
}
