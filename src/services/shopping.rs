use crate::http::Result;
use crate::schema::User;
use crate::shopping::ShoppingReport;
use crate::App;

#[derive(Debug)]
pub struct DownloadShoppingCart;

impl DownloadShoppingCart {
    #[tracing::instrument(skip(app, user), fields(user_id = %user.id), name = "services.shopping.download")]
    pub async fn perform(self, app: &App, user: &User) -> Result<ShoppingReport> {
        let rows = app.store().memberships().shopping_rows(user.id).await?;
        tracing::debug!(rows = rows.len(), "aggregating shopping list");

        Ok(ShoppingReport::build(rows, app.config.shopping.footer.as_str()))
    }
}
