//! Query string parsing for list endpoints.
//!
//! Parsed by hand on top of [`url::form_urlencoded`] because `tags`
//! may be repeated (`?tags=lunch&tags=dinner`), which the usual
//! struct based extractors do not support.
use std::borrow::Cow;
use std::num::NonZeroU64;

use super::{
    id::{marker::UserMarker, Id},
    Error, Pagination,
};

type Pairs<'a> = Vec<(Cow<'a, str>, Cow<'a, str>)>;

fn pairs(query: &str) -> Pairs<'_> {
    url::form_urlencoded::parse(query.as_bytes()).collect()
}

fn invalid(key: &str, expected: &str) -> Error {
    Error::InvalidRequest(format!("Invalid `{key}` query parameter: expected {expected}").into())
}

fn parse_nonzero(key: &str, value: &str) -> Result<NonZeroU64, Error> {
    value
        .parse::<NonZeroU64>()
        .map_err(|_| invalid(key, "a positive integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, Error> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(invalid(key, "`1`, `0`, `true` or `false`")),
    }
}

fn parse_pagination(pairs: &Pairs<'_>, default_limit: NonZeroU64) -> Result<Pagination, Error> {
    let mut pagination = Pagination::first(default_limit);
    for (key, value) in pairs {
        match key.as_ref() {
            "page" => pagination.page = parse_nonzero(key, value)?,
            "limit" => {
                let limit = parse_nonzero(key, value)?;
                if limit.get() > Pagination::MAX_LIMIT {
                    return Err(invalid(key, "at most 100"));
                }
                pagination.limit = limit;
            }
            _ => {}
        }
    }
    Ok(pagination)
}

/// `GET /api/recipes`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    pub pagination: Pagination,
    pub author: Option<Id<UserMarker>>,
    /// Tag slugs; a recipe matches if it carries any of them.
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeQuery {
    pub fn parse(query: &str) -> Result<Self, Error> {
        let pairs = pairs(query);
        let mut this = Self {
            pagination: parse_pagination(&pairs, Pagination::DEFAULT_LIMIT)?,
            ..Default::default()
        };

        for (key, value) in &pairs {
            match key.as_ref() {
                "author" => {
                    let id = parse_nonzero(key, value)?;
                    this.author = Some(Id::from_nonzero(id));
                }
                "tags" if !value.is_empty() => this.tags.push(value.to_string()),
                "is_favorited" => this.is_favorited = parse_flag(key, value)?,
                "is_in_shopping_cart" => this.is_in_shopping_cart = parse_flag(key, value)?,
                _ => {}
            }
        }

        Ok(this)
    }
}

/// `GET /api/ingredients`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

impl IngredientQuery {
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let name = pairs(query)
            .into_iter()
            .rev()
            .find(|(key, value)| key == "name" && !value.trim().is_empty())
            .map(|(_, value)| value.trim().to_string());

        Self { name }
    }
}

/// `GET /api/users/subscriptions`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionsQuery {
    pub pagination: Pagination,
    /// Caps how many recipes are embedded per followed author.
    pub recipes_limit: Option<NonZeroU64>,
}

impl SubscriptionsQuery {
    pub fn parse(query: &str) -> Result<Self, Error> {
        let pairs = pairs(query);
        let mut this = Self {
            pagination: parse_pagination(&pairs, Pagination::DEFAULT_LIMIT)?,
            recipes_limit: None,
        };

        for (key, value) in &pairs {
            if key == "recipes_limit" {
                this.recipes_limit = Some(parse_nonzero(key, value)?);
            }
        }

        Ok(this)
    }
}
