use crate::http::{Error, Result};
use crate::schema::Tag;
use crate::types::id::{marker::TagMarker, Id};
use crate::App;

#[derive(Debug)]
pub struct ListTags;

impl ListTags {
    #[tracing::instrument(skip(app), name = "services.tags.list")]
    pub async fn perform(self, app: &App) -> Result<Vec<Tag>> {
        Ok(app.store().tags().list().await?)
    }
}

#[derive(Debug)]
pub struct GetTag {
    pub id: Id<TagMarker>,
}

impl GetTag {
    #[tracing::instrument(skip(app), name = "services.tags.get")]
    pub async fn perform(self, app: &App) -> Result<Tag> {
        app.store()
            .tags()
            .find_by_id(self.id)
            .await?
            .ok_or_else(|| Error::not_found("Tag not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use crate::types::Error as ErrorType;

    #[tokio::test]
    async fn test_list_newest_first() {
        let app = test_utils::app();
        let slugs = ListTags
            .perform(&app)
            .await
            .unwrap()
            .into_iter()
            .map(|tag| tag.slug)
            .collect::<Vec<_>>();

        assert_eq!(slugs, vec!["dinner", "lunch", "breakfast"]);
    }

    #[tokio::test]
    async fn test_get_missing_tag() {
        let app = test_utils::app();
        let tag = GetTag { id: Id::new(2) }.perform(&app).await.unwrap();
        assert_eq!(tag.color, "#49B64E");

        let error = GetTag { id: Id::new(99) }.perform(&app).await.unwrap_err();
        assert_eq!(error.as_type(), &ErrorType::NotFound("Tag not found".into()));
    }
}
