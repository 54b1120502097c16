use serde::Deserialize;
use std::collections::HashSet;
use validator::{extras::validate_length, Validate, ValidateError};

use crate::{
    schema::IngredientAmount,
    store::{RecipeDraft, RecipePatch},
    types::{
        id::{
            marker::{IngredientMarker, TagMarker, UserMarker},
            Id,
        },
        validation::{NAME_MAX, SMALL_INT_MAX},
    },
};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IngredientEntry {
    pub id: Id<IngredientMarker>,
    pub amount: i32,
}

impl From<&IngredientEntry> for IngredientAmount {
    fn from(value: &IngredientEntry) -> Self {
        Self {
            ingredient_id: value.id,
            amount: value.amount,
        }
    }
}

/// `POST /api/recipes`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecipe {
    pub ingredients: Vec<IngredientEntry>,
    pub tags: Vec<Id<TagMarker>>,
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

/// `PATCH /api/recipes/{id}`
///
/// Collections that are present replace the stored ones entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecipe {
    pub ingredients: Option<Vec<IngredientEntry>>,
    pub tags: Option<Vec<Id<TagMarker>>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

impl CreateRecipe {
    #[must_use]
    pub fn into_draft(self, author_id: Id<UserMarker>) -> RecipeDraft {
        RecipeDraft {
            author_id,
            ingredients: self.ingredients.iter().map(IngredientAmount::from).collect(),
            tags: self.tags,
            image: self.image,
            name: self.name.trim().to_string(),
            text: self.text,
            cooking_time: self.cooking_time,
        }
    }
}

impl UpdateRecipe {
    #[must_use]
    pub fn into_patch(self) -> RecipePatch {
        RecipePatch {
            ingredients: self
                .ingredients
                .map(|v| v.iter().map(IngredientAmount::from).collect()),
            tags: self.tags,
            image: self.image,
            name: self.name.map(|v| v.trim().to_string()),
            text: self.text,
            cooking_time: self.cooking_time,
        }
    }
}

fn check_name(name: &str) -> ValidateError {
    let mut error = ValidateError::msg_builder();
    error.check(
        !validate_length(name.trim(), 1..=NAME_MAX),
        "Recipe name must be between 1 and 200 characters",
    );
    error.build()
}

fn check_not_blank(value: &str, message: &'static str) -> ValidateError {
    let mut error = ValidateError::msg_builder();
    error.check(value.trim().is_empty(), message);
    error.build()
}

fn check_cooking_time(minutes: i32) -> ValidateError {
    let mut error = ValidateError::msg_builder();
    if minutes < 1 {
        error.insert("Cooking time must be at least 1 minute");
    } else if minutes > SMALL_INT_MAX {
        error.insert("Cooking time is too long");
    }
    error.build()
}

fn check_ingredients(entries: &[IngredientEntry]) -> ValidateError {
    if entries.is_empty() {
        let mut error = ValidateError::msg_builder();
        error.insert("Recipe must have at least one ingredient");
        return error.build();
    }

    let mut seen = HashSet::new();
    let mut slice = ValidateError::slice_builder();
    for entry in entries {
        let mut fields = ValidateError::field_builder();
        if !seen.insert(entry.id) {
            let mut error = ValidateError::msg_builder();
            error.insert("Ingredient is listed more than once");
            fields.insert("id", error.build());
        }

        let mut error = ValidateError::msg_builder();
        if entry.amount < 1 {
            error.insert("Amount must be at least 1");
        } else if entry.amount > SMALL_INT_MAX {
            error.insert("Amount is too large");
        }
        fields.insert("amount", error.build());
        slice.insert(fields.build());
    }
    slice.build()
}

fn check_tags(tags: &[Id<TagMarker>]) -> ValidateError {
    let mut error = ValidateError::msg_builder();
    if tags.is_empty() {
        error.insert("Recipe must have at least one tag");
    } else {
        let unique = tags.iter().collect::<HashSet<_>>();
        error.check(unique.len() != tags.len(), "Tags must be unique");
    }
    error.build()
}

impl Validate for CreateRecipe {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("ingredients", check_ingredients(&self.ingredients));
        fields.insert("tags", check_tags(&self.tags));
        fields.insert("image", check_not_blank(&self.image, "Image is required"));
        fields.insert("name", check_name(&self.name));
        fields.insert("text", check_not_blank(&self.text, "Description is required"));
        fields.insert("cooking_time", check_cooking_time(self.cooking_time));
        fields.build().into_result()
    }
}

impl Validate for UpdateRecipe {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        if let Some(ingredients) = &self.ingredients {
            fields.insert("ingredients", check_ingredients(ingredients));
        }
        if let Some(tags) = &self.tags {
            fields.insert("tags", check_tags(tags));
        }
        if let Some(image) = &self.image {
            fields.insert("image", check_not_blank(image, "Image is required"));
        }
        if let Some(name) = &self.name {
            fields.insert("name", check_name(name));
        }
        if let Some(text) = &self.text {
            fields.insert("text", check_not_blank(text, "Description is required"));
        }
        if let Some(minutes) = self.cooking_time {
            fields.insert("cooking_time", check_cooking_time(minutes));
        }
        fields.build().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CreateRecipe {
        CreateRecipe {
            ingredients: vec![
                IngredientEntry {
                    id: Id::new(1),
                    amount: 200,
                },
                IngredientEntry {
                    id: Id::new(2),
                    amount: 2,
                },
            ],
            tags: vec![Id::new(1)],
            image: "https://cdn.foodgram.io/pancakes.png".into(),
            name: "Pancakes".into(),
            text: "Mix and fry.".into(),
            cooking_time: 20,
        }
    }

    fn failed_fields(error: ValidateError) -> Vec<String> {
        let ValidateError::Fields(fields) = error else {
            panic!("expected field errors");
        };
        fields.keys().map(ToString::to_string).collect()
    }

    #[test]
    fn test_accepts_valid_recipe() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_cooking_time() {
        let mut form = sample();
        form.cooking_time = 0;
        let error = form.validate().unwrap_err();
        assert_eq!(
            format!("{error:?}"),
            r#"{"cooking_time": {"_errors": ["Cooking time must be at least 1 minute"]}}"#
        );
    }

    #[test]
    fn test_rejects_duplicate_ingredients_and_bad_amounts() {
        let mut form = sample();
        form.ingredients.push(IngredientEntry {
            id: Id::new(1),
            amount: 0,
        });
        let error = form.validate().unwrap_err();
        assert_eq!(
            format!("{error:?}"),
            r#"{"ingredients": [None, None, Some({"id": {"_errors": ["Ingredient is listed more than once"]}, "amount": {"_errors": ["Amount must be at least 1"]}})]}"#
        );
    }

    #[test]
    fn test_rejects_empty_collections() {
        let mut form = sample();
        form.ingredients.clear();
        form.tags.clear();
        form.name = "   ".into();
        assert_eq!(
            failed_fields(form.validate().unwrap_err()),
            vec!["ingredients", "tags", "name"]
        );
    }

    #[test]
    fn test_update_only_checks_present_fields() {
        assert!(UpdateRecipe::default().validate().is_ok());

        let form = UpdateRecipe {
            cooking_time: Some(0),
            tags: Some(vec![Id::new(2), Id::new(2)]),
            ..Default::default()
        };
        assert_eq!(
            failed_fields(form.validate().unwrap_err()),
            vec!["tags", "cooking_time"]
        );
    }

    #[test]
    fn test_into_draft_trims_name() {
        let mut form = sample();
        form.name = "  Pancakes ".into();
        let draft = form.into_draft(Id::new(7));
        assert_eq!(draft.name, "Pancakes");
        assert_eq!(draft.author_id, Id::new(7));
        assert_eq!(draft.ingredients.len(), 2);
    }
}
