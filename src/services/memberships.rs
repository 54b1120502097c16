use crate::database::ErrorExt2;
use crate::http::{Error, Result};
use crate::schema::{MembershipKind, User};
use crate::types::id::{marker::RecipeMarker, Id};
use crate::types::view::MinimalRecipeView;
use crate::App;

/// Puts a recipe into the user's favorites or shopping list.
#[derive(Debug)]
pub struct AddMembership {
    pub kind: MembershipKind,
    pub recipe_id: Id<RecipeMarker>,
}

impl AddMembership {
    #[tracing::instrument(skip(app, user), fields(user_id = %user.id), name = "services.memberships.add")]
    pub async fn perform(self, app: &App, user: &User) -> Result<MinimalRecipeView> {
        let Some(recipe) = app.store().recipes().find_by_id(self.recipe_id).await? else {
            return Err(Error::not_found("Recipe not found"));
        };

        // The recipe may be deleted between the lookup and the insert
        let inserted = match app.store().memberships().add(self.kind, user.id, recipe.id).await {
            Err(report) if report.is_missing_reference() => {
                return Err(Error::not_found("Recipe not found"));
            }
            result => result?,
        };

        if !inserted {
            return Err(Error::already_exists(self.kind.already_exists_message()));
        }

        Ok(MinimalRecipeView::from(recipe))
    }
}

#[derive(Debug)]
pub struct RemoveMembership {
    pub kind: MembershipKind,
    pub recipe_id: Id<RecipeMarker>,
}

impl RemoveMembership {
    #[tracing::instrument(skip(app, user), fields(user_id = %user.id), name = "services.memberships.remove")]
    pub async fn perform(self, app: &App, user: &User) -> Result<()> {
        if app.store().recipes().find_by_id(self.recipe_id).await?.is_none() {
            return Err(Error::not_found("Recipe not found"));
        }

        let removed = app
            .store()
            .memberships()
            .remove(self.kind, user.id, self.recipe_id)
            .await?;

        if !removed {
            return Err(Error::not_found(self.kind.not_found_message()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use crate::types::Error as ErrorType;

    #[tokio::test]
    async fn test_add_twice() {
        let app = test_utils::app();
        let alice = test_utils::create_user(&app, "alice", false).await;
        let recipe = test_utils::create_recipe(&app, alice.id, "omelette", &[]).await;

        let add = || AddMembership {
            kind: MembershipKind::Favorite,
            recipe_id: recipe.id,
        };

        let view = add().perform(&app, &alice).await.unwrap();
        assert_eq!(view.id, recipe.id);
        assert_eq!(view.name, "omelette");

        let error = add().perform(&app, &alice).await.unwrap_err();
        assert_eq!(
            error.as_type(),
            &ErrorType::AlreadyExists("Recipe is already in favorites".into())
        );
    }

    #[tokio::test]
    async fn test_kinds_are_independent() {
        let app = test_utils::app();
        let alice = test_utils::create_user(&app, "alice", false).await;
        let recipe = test_utils::create_recipe(&app, alice.id, "omelette", &[]).await;

        AddMembership {
            kind: MembershipKind::ShoppingList,
            recipe_id: recipe.id,
        }
        .perform(&app, &alice)
        .await
        .unwrap();

        let memberships = app.store().memberships();
        assert!(memberships
            .contains(MembershipKind::ShoppingList, alice.id, recipe.id)
            .await
            .unwrap());
        assert!(!memberships
            .contains(MembershipKind::Favorite, alice.id, recipe.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_remove_missing_leaves_storage_unchanged() {
        let app = test_utils::app();
        let alice = test_utils::create_user(&app, "alice", false).await;
        let bob = test_utils::create_user(&app, "bob", false).await;
        let recipe = test_utils::create_recipe(&app, alice.id, "omelette", &[]).await;

        AddMembership {
            kind: MembershipKind::ShoppingList,
            recipe_id: recipe.id,
        }
        .perform(&app, &alice)
        .await
        .unwrap();

        let error = RemoveMembership {
            kind: MembershipKind::ShoppingList,
            recipe_id: recipe.id,
        }
        .perform(&app, &bob)
        .await
        .unwrap_err();
        assert_eq!(
            error.as_type(),
            &ErrorType::NotFound("Recipe is not in the shopping list".into())
        );

        assert!(app
            .store()
            .memberships()
            .contains(MembershipKind::ShoppingList, alice.id, recipe.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_unknown_recipe() {
        let app = test_utils::app();
        let alice = test_utils::create_user(&app, "alice", false).await;

        let error = AddMembership {
            kind: MembershipKind::Favorite,
            recipe_id: Id::new(404),
        }
        .perform(&app, &alice)
        .await
        .unwrap_err();
        assert_eq!(error.as_type(), &ErrorType::NotFound("Recipe not found".into()));

        let error = RemoveMembership {
            kind: MembershipKind::Favorite,
            recipe_id: Id::new(404),
        }
        .perform(&app, &alice)
        .await
        .unwrap_err();
        assert_eq!(error.as_type(), &ErrorType::NotFound("Recipe not found".into()));
    }
}
