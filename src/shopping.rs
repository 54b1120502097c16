//! Shopping list aggregation.
//!
//! Rows of every recipe in a user's shopping list are grouped by
//! ingredient identity and their amounts are summed. Two distinct
//! ingredients that happen to share a name stay on separate lines.
use indexmap::IndexMap;

use crate::schema::RecipeIngredient;
use crate::types::id::{marker::IngredientMarker, Id};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub ingredient_id: Id<IngredientMarker>,
    pub name: String,
    pub measurement_unit: String,
    pub amount: u64,
}

impl ShoppingItem {
    #[must_use]
    pub fn line(&self) -> String {
        format!("{} - {} {}", self.name, self.amount, self.measurement_unit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingReport {
    items: Vec<ShoppingItem>,
    footer: String,
}

impl ShoppingReport {
    /// Groups `rows` in first-seen order.
    pub fn build(rows: impl IntoIterator<Item = RecipeIngredient>, footer: impl Into<String>) -> Self {
        let mut groups: IndexMap<Id<IngredientMarker>, ShoppingItem> = IndexMap::new();
        for row in rows {
            let amount = u64::try_from(row.amount).unwrap_or_default();
            groups
                .entry(row.id)
                .and_modify(|item| item.amount = item.amount.saturating_add(amount))
                .or_insert_with(|| ShoppingItem {
                    ingredient_id: row.id,
                    name: row.name,
                    measurement_unit: row.measurement_unit,
                    amount,
                });
        }

        Self {
            items: groups.into_values().collect(),
            footer: footer.into(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    /// One line per ingredient followed by a blank line and the footer.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.items.iter().map(ShoppingItem::line).collect::<Vec<_>>();
        lines.push(String::new());
        lines.push(self.footer.clone());
        lines
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.lines().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOOTER: &str = "Foodgram | shopping list";

    fn row(id: u64, name: &str, unit: &str, amount: i32) -> RecipeIngredient {
        RecipeIngredient {
            id: Id::new(id),
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_sums_shared_ingredient() {
        let report = ShoppingReport::build(
            [
                row(1, "flour", "g", 200),
                row(2, "egg", "pcs", 2),
                row(1, "flour", "g", 300),
            ],
            FOOTER,
        );

        assert_eq!(
            report.lines(),
            vec!["flour - 500 g", "egg - 2 pcs", "", FOOTER]
        );
        assert_eq!(report.text(), format!("flour - 500 g\negg - 2 pcs\n\n{FOOTER}"));
    }

    #[test]
    fn test_empty_list() {
        let report = ShoppingReport::build(Vec::new(), FOOTER);
        assert!(report.items().is_empty());
        assert_eq!(report.lines(), vec!["", FOOTER]);
        assert_eq!(report.text(), format!("\n{FOOTER}"));
    }

    #[test]
    fn test_same_name_different_ingredients() {
        let report = ShoppingReport::build(
            [row(1, "salt", "g", 5), row(2, "salt", "tsp", 1), row(1, "salt", "g", 5)],
            FOOTER,
        );

        assert_eq!(report.lines(), vec!["salt - 10 g", "salt - 1 tsp", "", FOOTER]);
    }

    #[test]
    fn test_keeps_first_seen_order() {
        let report = ShoppingReport::build(
            [
                row(9, "sugar", "g", 10),
                row(3, "butter", "g", 50),
                row(9, "sugar", "g", 15),
            ],
            FOOTER,
        );

        let ids = report
            .items()
            .iter()
            .map(|item| item.ingredient_id.get())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![9, 3]);
        assert_eq!(report.items()[0].amount, 25);
    }
}
