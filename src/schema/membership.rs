/// Per-user recipe collections sharing the same add/remove semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipKind {
    Favorite,
    ShoppingList,
}

impl MembershipKind {
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::ShoppingList => "shopping_list",
        }
    }

    #[must_use]
    pub const fn already_exists_message(self) -> &'static str {
        match self {
            Self::Favorite => "Recipe is already in favorites",
            Self::ShoppingList => "Recipe is already in the shopping list",
        }
    }

    #[must_use]
    pub const fn not_found_message(self) -> &'static str {
        match self {
            Self::Favorite => "Recipe is not in favorites",
            Self::ShoppingList => "Recipe is not in the shopping list",
        }
    }
}
