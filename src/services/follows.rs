use std::num::NonZeroU64;

use super::users::render_user;
use crate::http::{Error, Result};
use crate::schema::User;
use crate::store::Paged;
use crate::types::id::{marker::UserMarker, Id};
use crate::types::query::SubscriptionsQuery;
use crate::types::view::{FollowedUserView, MinimalRecipeView};
use crate::App;

async fn render_followed(
    app: &App,
    author: User,
    viewer: &User,
    recipes_limit: Option<NonZeroU64>,
) -> Result<FollowedUserView> {
    let recipes = app
        .store()
        .recipes()
        .find_by_author(author.id, recipes_limit.map(NonZeroU64::get))
        .await?;

    Ok(FollowedUserView {
        user: render_user(app, author, Some(viewer)).await?,
        recipes: recipes.items.into_iter().map(MinimalRecipeView::from).collect(),
        recipes_count: recipes.total,
    })
}

#[derive(Debug)]
pub struct FollowUser {
    pub target: Id<UserMarker>,
}

impl FollowUser {
    #[tracing::instrument(skip(app, user), fields(user_id = %user.id), name = "services.follows.follow")]
    pub async fn perform(self, app: &App, user: &User) -> Result<FollowedUserView> {
        // The target user must not be themselves
        if user.id == self.target {
            return Err(Error::invalid_request("You cannot follow yourself"));
        }

        let Some(author) = app.store().users().find_by_id(self.target).await? else {
            return Err(Error::not_found("User not found"));
        };

        if !app.store().follows().follow(user.id, author.id).await? {
            return Err(Error::already_exists("You are already following this user"));
        }

        render_followed(app, author, user, None).await
    }
}

#[derive(Debug)]
pub struct UnfollowUser {
    pub target: Id<UserMarker>,
}

impl UnfollowUser {
    #[tracing::instrument(skip(app, user), fields(user_id = %user.id), name = "services.follows.unfollow")]
    pub async fn perform(self, app: &App, user: &User) -> Result<()> {
        if user.id == self.target {
            return Err(Error::invalid_request("You cannot unfollow yourself"));
        }

        if app.store().users().find_by_id(self.target).await?.is_none() {
            return Err(Error::not_found("User not found"));
        }

        if !app.store().follows().unfollow(user.id, self.target).await? {
            return Err(Error::not_found("You are not following this user"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ListFollows {
    pub query: SubscriptionsQuery,
}

impl ListFollows {
    #[tracing::instrument(skip(app, user), fields(user_id = %user.id), name = "services.follows.list")]
    pub async fn perform(self, app: &App, user: &User) -> Result<Paged<FollowedUserView>> {
        let authors = app
            .store()
            .follows()
            .followed_authors(user.id, self.query.pagination)
            .await?;

        let mut items = Vec::with_capacity(authors.items.len());
        for author in authors.items {
            items.push(render_followed(app, author, user, self.query.recipes_limit).await?);
        }

        Ok(Paged {
            total: authors.total,
            items,
        })
    }
}
