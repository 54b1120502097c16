use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;
use validator::{Validate, ValidateError};

use super::{Database, Logging, ParseError};
use crate::util::{figment::FigmentErrorAttachable, validator::IntoValidatorReport, Sensitive};

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// **Environment variables**:
    /// - `FOODGRAM_ADDRESS`
    #[serde(default = "Server::default_address")]
    pub address: IpAddr,
    /// **Environment variables**:
    /// - `FOODGRAM_PORT`
    #[serde(default = "Server::default_port")]
    pub port: u16,
    /// Amount of HTTP workers; defaults to the number of CPU cores.
    ///
    /// **Environment variables**:
    /// - `FOODGRAM_WORKERS`
    pub workers: Option<NonZeroUsize>,
    /// Required unless the server runs with `--in-memory`.
    pub db: Option<Database>,
    pub auth: Auth,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub shopping: Shopping,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    /// Shared HS512 secret used to verify bearer tokens.
    ///
    /// **Environment variables**:
    /// - `FOODGRAM_AUTH_JWT_SECRET`
    pub jwt_secret: Sensitive<String>,
    /// Lifetime of tokens minted by `foodgram token`.
    ///
    /// **Environment variables**:
    /// - `FOODGRAM_AUTH_TOKEN_TTL_SECS`
    #[serde(default = "Auth::default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

/// Shopping list download settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Shopping {
    /// Attribution line written at the end of every shopping list.
    ///
    /// **Environment variables**:
    /// - `FOODGRAM_SHOPPING_FOOTER`
    pub footer: String,
    /// **Environment variables**:
    /// - `FOODGRAM_SHOPPING_FILENAME`
    pub filename: String,
}

impl Default for Shopping {
    fn default() -> Self {
        Self {
            footer: String::from("Foodgram | shopping list"),
            filename: String::from("wishlist.txt"),
        }
    }
}

impl Auth {
    const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60 * 24;
    const JWT_SECRET_MIN: usize = 12;
    const JWT_SECRET_MAX: usize = 1024;

    const fn default_token_ttl_secs() -> u64 {
        Self::DEFAULT_TOKEN_TTL_SECS
    }
}

impl Validate for Auth {
    fn validate(&self) -> std::result::Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("jwt_secret", {
            let mut error = ValidateError::msg_builder();
            error.check(
                !validator::extras::validate_length(
                    self.jwt_secret.as_str(),
                    Self::JWT_SECRET_MIN..=Self::JWT_SECRET_MAX,
                ),
                "Invalid JWT secret key",
            );
            error.build()
        });
        fields.build().into_result()
    }
}

impl Validate for Shopping {
    fn validate(&self) -> std::result::Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("footer", {
            let mut error = ValidateError::msg_builder();
            error.check(
                self.footer.contains('\n'),
                "Footer must be a single line",
            );
            error.build()
        });
        fields.insert("filename", {
            let mut error = ValidateError::msg_builder();
            error.check(
                self.filename.is_empty()
                    || self
                        .filename
                        .contains(|c: char| matches!(c, '"' | '/' | '\\') || c.is_control()),
                "Invalid attachment file name",
            );
            error.build()
        });
        fields.build().into_result()
    }
}

impl Validate for Server {
    fn validate(&self) -> std::result::Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        if let Err(error) = self.db.validate() {
            fields.insert("db", error);
        }
        if let Err(error) = self.auth.validate() {
            fields.insert("auth", error);
        }
        if let Err(error) = self.shopping.validate() {
            fields.insert("shopping", error);
        }
        fields.build().into_result()
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "foodgram.toml";
    const DEFAULT_PORT: u16 = 8000;

    const fn default_address() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_port() -> u16 {
        Self::DEFAULT_PORT
    }

    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();
        Self::from_figment(&Self::figment())
    }

    pub(crate) fn from_figment(figment: &figment::Figment) -> Result<Self, ParseError> {
        let config = figment
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config
            .validate()
            .into_validator_report()
            .change_context(ParseError)?;

        Ok(config)
    }

    /// Creates a default [`Figment`](figment::Figment) object to load
    /// server configuration from `foodgram.toml` and `FOODGRAM_*`
    /// environment variables.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // Env keys with underscores inside a field name need
            // explicit mappings, everything else splits on `_`.
            .merge(Env::prefixed("FOODGRAM_").map(|v| {
                match v.as_str().to_ascii_uppercase().as_str() {
                    "DB_PRIMARY_MIN_IDLE" => "db.primary.min_idle".into(),
                    "DB_PRIMARY_POOL_SIZE" => "db.primary.pool_size".into(),

                    "DB_REPLICA_MIN_IDLE" => "db.replica.min_idle".into(),
                    "DB_REPLICA_POOL_SIZE" => "db.replica.pool_size".into(),

                    "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                    "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

                    "AUTH_JWT_SECRET" => "auth.jwt_secret".into(),
                    "AUTH_TOKEN_TTL_SECS" => "auth.token_ttl_secs".into(),

                    _ => v.as_str().to_ascii_lowercase().replace('_', ".").into(),
                }
            }))
            // Environment variable aliases
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "db.primary.url".into()),
            )
    }
}
