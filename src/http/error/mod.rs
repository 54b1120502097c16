use error_stack::{Context, Report};
use std::borrow::Cow;
use thiserror::Error as ThisError;
use tracing_error::SpanTrace;

use crate::types;

mod impls;

pub type Result<T> = std::result::Result<T, Error>;

/// Root context every report of a failed request is folded into.
#[derive(Debug, ThisError)]
#[error("Failed to perform request")]
pub struct RequestError;

/// Error returned by services and controllers.
///
/// Clients only ever see [`types::Error`]; the report and span trace
/// are kept for the server logs.
pub struct Error {
    error_type: types::Error,
    report: Report<RequestError>,
    trace: SpanTrace,
}

impl Error {
    #[must_use]
    pub fn new(error_type: types::Error) -> Self {
        let report = Report::new(RequestError).attach_printable(error_type.to_string());
        Self {
            error_type,
            report,
            trace: SpanTrace::capture(),
        }
    }

    #[must_use]
    pub fn from_context(error_type: types::Error, context: impl Context) -> Self {
        Self::from_report(error_type, Report::new(context))
    }

    #[must_use]
    pub fn from_report<C: Context>(error_type: types::Error, report: Report<C>) -> Self {
        Self {
            error_type,
            report: report.change_context(RequestError),
            trace: SpanTrace::capture(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(types::Error::NotFound(message.into()))
    }

    #[must_use]
    pub fn already_exists(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(types::Error::AlreadyExists(message.into()))
    }

    #[must_use]
    pub fn invalid_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(types::Error::InvalidRequest(message.into()))
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(types::Error::Unauthorized)
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(types::Error::Forbidden)
    }
}

impl Error {
    #[must_use]
    pub fn as_type(&self) -> &types::Error {
        &self.error_type
    }

    /// Drops the client facing part, used outside of HTTP handlers.
    #[must_use]
    pub fn into_report(self) -> Report<RequestError> {
        self.report.attach_printable(self.error_type.to_string())
    }

    #[must_use]
    pub fn attach_printable(mut self, message: impl Into<String>) -> Self {
        self.report = self.report.attach_printable(message.into());
        self
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("type", &self.error_type)
            .field("report", &self.report)
            .field("trace", &self.trace)
            .finish()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.error_type.code())?;
        writeln!(f, "{:?}", self.report)?;
        std::fmt::Display::fmt(&self.trace, f)
    }
}

impl From<types::Error> for Error {
    fn from(value: types::Error) -> Self {
        Self::new(value)
    }
}
