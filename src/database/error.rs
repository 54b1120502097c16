use error_stack::Report;
use thiserror::Error;

/// Database related errors
#[derive(Debug, Error)]
pub enum Error {
    /// The configured Postgres connection URL could not be parsed.
    #[error("invalid connection url")]
    InvalidUrl,
    /// An error caused by an [`sqlx`] error.
    #[error("received a pool error: {0}")]
    Internal(sqlx::Error),
    /// The primary pool is in read-only mode (most likely due to
    /// maintenance) and must not perform any writes.
    #[error("database is currently in read mode")]
    Readonly,
    /// A write referenced a row that no longer exists.
    #[error("referenced row does not exist")]
    MissingReference,
    /// No connection could be acquired within the configured timeout.
    #[error("unhealthy database pool")]
    UnhealthyPool,
    /// Failed to apply the embedded migrations.
    #[error("failed to run database migrations")]
    Migration,
}

/// Converts from a generic [sqlx] result into a [database compatible error](Error).
pub trait ErrorExt<T> {
    fn into_db_error(self) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn into_db_error(self) -> Result<T> {
        self.map_err(|e| match &e {
            sqlx::Error::Database(err) if err.message().ends_with("read-only transaction") => {
                Report::new(e).change_context(Error::Readonly)
            }
            sqlx::Error::Database(err) if err.is_foreign_key_violation() => {
                Report::new(e).change_context(Error::MissingReference)
            }
            sqlx::Error::PoolTimedOut => Report::new(e).change_context(Error::UnhealthyPool),
            _ => Report::new(Error::Internal(e)),
        })
    }
}

/// Lazily typed [`std::result::Result`] but the error generic
/// is filled up with [a database error](Error).
pub type Result<T> = error_stack::Result<T, Error>;

/// Checks the context of a `Report<Error>` without matching on
/// `downcast_ref` at every call site.
pub trait ErrorExt2 {
    fn is_unhealthy(&self) -> bool;
    fn is_readonly(&self) -> bool;
    fn is_missing_reference(&self) -> bool;
}

impl ErrorExt2 for Report<Error> {
    fn is_unhealthy(&self) -> bool {
        self.downcast_ref::<Error>()
            .map(|v| matches!(v, Error::UnhealthyPool))
            .unwrap_or_default()
    }

    fn is_readonly(&self) -> bool {
        self.downcast_ref::<Error>()
            .map(|v| matches!(v, Error::Readonly))
            .unwrap_or_default()
    }

    fn is_missing_reference(&self) -> bool {
        self.downcast_ref::<Error>()
            .map(|v| matches!(v, Error::MissingReference))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_unhealthy() {
        let report = Err::<(), _>(sqlx::Error::PoolTimedOut)
            .into_db_error()
            .unwrap_err();
        assert!(report.is_unhealthy());
        assert!(!report.is_readonly());
    }

    #[test]
    fn test_readonly_context() {
        let report = Report::new(Error::Readonly);
        assert!(report.is_readonly());
        assert!(!report.is_unhealthy());
        assert!(!report.is_missing_reference());
    }

    #[test]
    fn test_missing_reference_context() {
        let report = Report::new(Error::MissingReference);
        assert!(report.is_missing_reference());
        assert!(!report.is_readonly());
    }
}
