use chrono::Utc;
use error_stack::{Result, ResultExt};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config,
    types::id::{marker::UserMarker, Id},
};

#[derive(Debug, Error)]
#[error("Invalid or expired session token")]
pub struct JwtError;

/// Claims of a bearer token issued by the authentication service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Jwt {
    pub user_id: Id<UserMarker>,
    pub iat: i64,
    pub exp: i64,
}

impl Jwt {
    const ALGORITHM: Algorithm = Algorithm::HS512;

    #[must_use]
    pub fn new(user_id: Id<UserMarker>, ttl_secs: u64) -> Self {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        Self {
            user_id,
            iat,
            exp: iat.saturating_add(ttl),
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn decode(token: &str, auth: &config::Auth) -> Result<Self, JwtError> {
        let key = DecodingKey::from_secret(auth.jwt_secret.as_str().as_bytes());
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.set_required_spec_claims(&["exp"]);

        jsonwebtoken::decode::<Self>(token, &key, &validation)
            .map(|data| data.claims)
            .change_context(JwtError)
    }

    #[tracing::instrument(skip_all, fields(user_id = %self.user_id))]
    pub fn encode(&self, auth: &config::Auth) -> Result<String, JwtError> {
        let header = Header::new(Self::ALGORITHM);
        let key = EncodingKey::from_secret(auth.jwt_secret.as_str().as_bytes());
        jsonwebtoken::encode(&header, self, &key).change_context(JwtError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Sensitive;

    fn auth(secret: &str) -> config::Auth {
        config::Auth {
            jwt_secret: Sensitive::new(secret.to_string()),
            token_ttl_secs: 60,
        }
    }

    #[test]
    fn test_encode_then_decode() {
        let auth = auth("super secret jwt key");
        let claims = Jwt::new(Id::new(42), 60);
        let token = claims.encode(&auth).unwrap();
        assert_eq!(Jwt::decode(&token, &auth).unwrap(), claims);
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired() {
        let token = Jwt::new(Id::new(1), 60)
            .encode(&auth("super secret jwt key"))
            .unwrap();
        assert!(Jwt::decode(&token, &auth("another secret key")).is_err());

        let mut expired = Jwt::new(Id::new(1), 0);
        expired.exp -= 3600;
        let token = expired.encode(&auth("super secret jwt key")).unwrap();
        assert!(Jwt::decode(&token, &auth("super secret jwt key")).is_err());
    }
}
