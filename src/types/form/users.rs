use serde::Deserialize;
use validator::{Validate, ValidateError};

use crate::types::validation::{self, is_valid_email, is_valid_username};

/// Account created by `foodgram create-user`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Validate for CreateUser {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("email", {
            let mut error = ValidateError::msg_builder();
            error.check(!is_valid_email(&self.email), "Invalid e-mail address");
            error.build()
        });
        fields.insert("username", {
            let mut error = ValidateError::msg_builder();
            error.check(!is_valid_username(&self.username), "Invalid username");
            error.build()
        });
        for (key, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
        ] {
            let mut error = ValidateError::msg_builder();
            error.check(
                !validator::extras::validate_length(value, 1..=validation::USERNAME_MAX),
                "Must be between 1 and 150 characters",
            );
            fields.insert(key, error.build());
        }
        fields.build().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let mut form = CreateUser {
            email: "anna@foodgram.io".into(),
            username: "anna".into(),
            first_name: "Anna".into(),
            last_name: "Petrova".into(),
            is_admin: false,
        };
        assert!(form.validate().is_ok());

        form.email = "anna".into();
        form.last_name = String::new();
        let error = form.validate().unwrap_err();
        let ValidateError::Fields(fields) = error else {
            panic!("expected field errors");
        };
        assert_eq!(fields.len(), 2);
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("last_name"));
    }
}
