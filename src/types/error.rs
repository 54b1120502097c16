use serde::{ser::SerializeMap, Serialize};
use std::borrow::Cow;
use std::fmt::Display;
use validator::ValidateError;

/// Every error a client of the Foodgram API can receive.
///
/// Serialized as `{"type": ..., "message": ...}` with an extra
/// `errors` object for [`Error::InvalidFormBody`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Internal,
    ReadonlyMode,
    Unauthorized,
    Forbidden,
    NotFound(Cow<'static, str>),
    AlreadyExists(Cow<'static, str>),
    InvalidRequest(Cow<'static, str>),
    InvalidFormBody(ValidateError),
}

impl Error {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::ReadonlyMode => "readonly_mode",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound(..) => "not_found",
            Self::AlreadyExists(..) => "already_exists",
            Self::InvalidRequest(..) => "invalid_request",
            Self::InvalidFormBody(..) => "invalid_form_body",
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Internal => "Failed to perform request",
            Self::ReadonlyMode => "Service is temporarily in read-only mode",
            Self::Unauthorized => "Authentication credentials were not provided or are invalid",
            Self::Forbidden => "You do not have permission to perform this action",
            Self::NotFound(message)
            | Self::AlreadyExists(message)
            | Self::InvalidRequest(message) => &**message,
            Self::InvalidFormBody(..) => "Request body contains invalid data",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let len = if matches!(self, Self::InvalidFormBody(..)) {
            3
        } else {
            2
        };

        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", self.code())?;
        map.serialize_entry("message", self.message())?;
        if let Self::InvalidFormBody(errors) = self {
            map.serialize_entry("errors", errors)?;
        }
        map.end()
    }
}
