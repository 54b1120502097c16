use std::borrow::Cow;

use error_stack::Report;
use thiserror::Error;
use validator::ValidateError;

#[derive(Debug, Error)]
#[error("Invalid given data occurred")]
pub struct Wrapper;

/// Flattens a [`ValidateError`] tree into `path: message` attachments
/// so it can be printed by `error_stack`.
pub trait IntoValidatorReport<T> {
    fn into_validator_report(self) -> error_stack::Result<T, Wrapper>;
}

fn read_errors<'a>(
    err: &'a ValidateError,
    path: &mut Vec<Cow<'a, str>>,
    mut report: Report<Wrapper>,
) -> Report<Wrapper> {
    match err {
        ValidateError::Fields(fields) => {
            for (field, data) in fields {
                path.push(Cow::Borrowed(field));
                report = read_errors(data, path, report);
                path.pop();
            }
        }
        ValidateError::Messages(messages) => {
            let field = path.join(".");
            for message in messages {
                report = report.attach_printable(format!("{field}: {message}"));
            }
        }
        ValidateError::Slice(slice) => {
            for (index, element) in slice.iter().enumerate() {
                if let Some(element) = element {
                    path.push(Cow::Owned(index.to_string()));
                    report = read_errors(element, path, report);
                    path.pop();
                }
            }
        }
    }
    report
}

impl<T> IntoValidatorReport<T> for Result<T, ValidateError> {
    fn into_validator_report(self) -> error_stack::Result<T, Wrapper> {
        self.map_err(|error| read_errors(&error, &mut Vec::new(), Report::new(Wrapper)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattens_paths() {
        let mut slice = ValidateError::slice_builder();
        slice.insert_empty();
        slice.insert(ValidateError::field("amount", "Amount must be at least 1"));

        let mut fields = ValidateError::field_builder();
        fields.insert("ingredients", slice.build());

        let report = Err::<(), _>(fields.build())
            .into_validator_report()
            .unwrap_err();

        let output = format!("{report:?}");
        assert!(output.contains("ingredients.1.amount: Amount must be at least 1"));
    }
}
