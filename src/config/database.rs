use serde::Deserialize;
use std::num::{NonZeroU32, NonZeroU64};
use validator::{Validate, ValidateError};

use crate::util::Sensitive;

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    /// Writable primary database.
    pub primary: DbPoolConfig,
    /// A read-only replica used for list and detail queries so the
    /// primary only has to take writes.
    pub replica: Option<DbPoolConfig>,
    /// Forces all database connections to be encrypted with TLS.
    ///
    /// **Environment variables**:
    /// - `FOODGRAM_DB_ENFORCE_TLS`
    #[serde(default = "DbPoolConfig::default_enforce_tls")]
    pub enforce_tls: bool,
    /// How long a request may wait for a pooled connection.
    ///
    /// **Environment variables**:
    /// - `FOODGRAM_DB_TIMEOUT_SECS`
    #[serde(default = "DbPoolConfig::default_pool_timeout_secs")]
    pub timeout_secs: NonZeroU64,
}

/// Configuration for connecting to any Postgres database
#[derive(Debug, Clone, Deserialize)]
pub struct DbPoolConfig {
    /// Every write against this pool is refused with
    /// `readonly_mode` before reaching the database.
    ///
    /// **Environment variables**:
    /// - `FOODGRAM_DB_PRIMARY_READONLY`
    /// - `FOODGRAM_DB_REPLICA_READONLY`
    #[serde(default)]
    pub readonly: bool,
    /// **Environment variables**:
    /// - `FOODGRAM_DB_PRIMARY_MIN_IDLE`
    /// - `FOODGRAM_DB_REPLICA_MIN_IDLE`
    pub min_idle: Option<NonZeroU32>,
    /// **Environment variables**:
    /// - `FOODGRAM_DB_PRIMARY_POOL_SIZE`
    /// - `FOODGRAM_DB_REPLICA_POOL_SIZE`
    #[serde(default = "DbPoolConfig::default_pool_size")]
    pub pool_size: NonZeroU32,
    /// Connection URL of the Postgres database.
    ///
    /// **Environment variables**:
    /// - `FOODGRAM_DB_PRIMARY_URL` or `DATABASE_URL`
    /// - `FOODGRAM_DB_REPLICA_URL`
    pub url: Sensitive<String>,
}

impl DbPoolConfig {
    const DEFAULT_POOL_SIZE: u32 = 5;
    const DEFAULT_POOL_TIMEOUT_SECS: u64 = 5;

    // Required by serde
    const fn default_pool_size() -> NonZeroU32 {
        match NonZeroU32::new(Self::DEFAULT_POOL_SIZE) {
            Some(n) => n,
            None => panic!("DEFAULT_POOL_SIZE is accidentally set to 0"),
        }
    }

    const fn default_pool_timeout_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_POOL_TIMEOUT_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_POOL_TIMEOUT_SECS is accidentally set to 0"),
        }
    }

    const fn default_enforce_tls() -> bool {
        true
    }
}

impl Validate for DbPoolConfig {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("url", {
            let mut error = ValidateError::msg_builder();
            error.check(
                !validator::extras::validate_url(self.url.as_str()),
                "Invalid Postgres connection URL",
            );
            error.build()
        });
        if let Some(min_idle) = self.min_idle {
            fields.insert("min_idle", {
                let mut error = ValidateError::msg_builder();
                error.check(
                    min_idle > self.pool_size,
                    "Minimum idle connections must not exceed the pool size",
                );
                error.build()
            });
        }
        fields.build().into_result()
    }
}

impl Validate for Database {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        if let Err(error) = self.primary.validate() {
            fields.insert("primary", error);
        }
        if let Err(error) = self.replica.validate() {
            fields.insert("replica", error);
        }
        fields.build().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(url: &str) -> DbPoolConfig {
        DbPoolConfig {
            readonly: false,
            min_idle: None,
            pool_size: DbPoolConfig::default_pool_size(),
            url: Sensitive::new(url.to_string()),
        }
    }

    #[test]
    fn test_validate_urls() {
        let mut config = Database {
            primary: pool("postgres://foodgram@localhost/foodgram"),
            replica: None,
            enforce_tls: false,
            timeout_secs: DbPoolConfig::default_pool_timeout_secs(),
        };
        assert!(config.validate().is_ok());

        config.replica = Some(pool("not a url"));
        let error = config.validate().unwrap_err();
        assert_eq!(
            format!("{error:?}"),
            r#"{"replica": {"url": {"_errors": ["Invalid Postgres connection URL"]}}}"#
        );
    }

    #[test]
    fn test_min_idle_bounded_by_pool_size() {
        let mut config = pool("postgres://localhost/foodgram");
        config.min_idle = NonZeroU32::new(10);
        assert!(config.validate().is_err());

        config.min_idle = NonZeroU32::new(2);
        assert!(config.validate().is_ok());
    }
}
