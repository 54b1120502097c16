//! Small validation toolkit used by every request form and
//! configuration struct in Foodgram.
//!
//! Errors are collected into a [`ValidateError`] tree (fields, messages
//! and slices) so a client receives every problem of a payload at once
//! instead of only the first one.
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;

pub mod extras;
pub use error::*;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidateError>;
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), ValidateError> {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut slice = ValidateError::slice_builder();
        for element in self {
            match element.validate() {
                Ok(()) => slice.insert_empty(),
                Err(error) => slice.insert(error),
            }
        }
        slice.build().into_result()
    }
}
