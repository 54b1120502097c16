use clap::Parser;
use error_stack::{Report, Result, ResultExt};
use foodgram::store::PgStore;

use super::CommandError;

/// Apply pending database migrations
#[derive(Debug, Parser)]
pub struct MigrateCommand {}

pub fn run(_args: MigrateCommand) -> Result<(), CommandError> {
    let config = super::setup()?;
    let db = config
        .db
        .as_ref()
        .ok_or(CommandError)
        .attach_printable("database configuration is missing, set DATABASE_URL")?;

    let store = PgStore::new(db).change_context(CommandError)?;
    super::runtime(None)?.block_on(async {
        store.primary().migrate().await.change_context(CommandError)?;
        tracing::info!("database is up to date");
        Ok::<_, Report<CommandError>>(())
    })
}
