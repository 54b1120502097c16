use validator::Validate;

use crate::http::{Error, Result};
use crate::schema::{NewUser, User};
use crate::types::form::users::CreateUser as CreateUserForm;
use crate::types::id::{marker::UserMarker, Id};
use crate::types::view::UserView;
use crate::App;

/// Renders `user` as seen by `viewer`.
pub(crate) async fn render_user(app: &App, user: User, viewer: Option<&User>) -> Result<UserView> {
    let is_subscribed = match viewer {
        Some(viewer) if viewer.id != user.id => {
            app.store().follows().is_following(viewer.id, user.id).await?
        }
        _ => false,
    };
    Ok(UserView::new(user, is_subscribed))
}

#[derive(Debug)]
pub struct GetUser {
    pub id: Id<UserMarker>,
}

impl GetUser {
    #[tracing::instrument(skip(app, viewer), name = "services.users.get")]
    pub async fn perform(self, app: &App, viewer: Option<&User>) -> Result<UserView> {
        let Some(user) = app.store().users().find_by_id(self.id).await? else {
            return Err(Error::not_found("User not found"));
        };
        render_user(app, user, viewer).await
    }
}

#[derive(Debug)]
pub struct CurrentUser;

impl CurrentUser {
    #[tracing::instrument(skip_all, name = "services.users.me")]
    pub async fn perform(self, app: &App, user: User) -> Result<UserView> {
        render_user(app, user, None).await
    }
}

/// Operator-only account creation, used by `foodgram create-user`.
#[derive(Debug)]
pub struct CreateUser {
    pub form: CreateUserForm,
}

impl CreateUser {
    #[tracing::instrument(skip_all, name = "services.users.create")]
    pub async fn perform(self, app: &App) -> Result<User> {
        self.form.validate()?;

        let form = self.form;
        let user = app
            .store()
            .users()
            .create(&NewUser {
                email: form.email,
                username: form.username,
                first_name: form.first_name,
                last_name: form.last_name,
                is_admin: form.is_admin,
            })
            .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::follows::FollowUser;
    use crate::test_utils;

    #[tokio::test]
    async fn test_is_subscribed_depends_on_viewer() {
        let app = test_utils::app();
        let alice = test_utils::create_user(&app, "alice", false).await;
        let bob = test_utils::create_user(&app, "bob", false).await;

        let view = GetUser { id: bob.id }.perform(&app, Some(&alice)).await.unwrap();
        assert!(!view.is_subscribed);

        FollowUser { target: bob.id }.perform(&app, &alice).await.unwrap();

        let view = GetUser { id: bob.id }.perform(&app, Some(&alice)).await.unwrap();
        assert!(view.is_subscribed);
        let view = GetUser { id: bob.id }.perform(&app, None).await.unwrap();
        assert!(!view.is_subscribed);
        assert_eq!(view.username, "bob");
    }

    #[tokio::test]
    async fn test_missing_user() {
        let app = test_utils::app();
        let error = GetUser { id: Id::new(7) }.perform(&app, None).await.unwrap_err();
        assert_eq!(
            error.as_type(),
            &crate::types::Error::NotFound("User not found".into())
        );
    }

    #[tokio::test]
    async fn test_create_user_validates() {
        let app = test_utils::app();
        let form = CreateUserForm {
            email: "not an email".into(),
            username: "carol".into(),
            first_name: "Carol".into(),
            last_name: "Cook".into(),
            is_admin: false,
        };
        let error = CreateUser { form }.perform(&app).await.unwrap_err();
        assert!(matches!(
            error.as_type(),
            crate::types::Error::InvalidFormBody(..)
        ));
    }
}
