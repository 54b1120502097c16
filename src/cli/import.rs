use clap::Parser;
use error_stack::{Report, Result, ResultExt};
use foodgram::schema::NewIngredient;
use foodgram::services::ingredients::ImportIngredients;
use std::path::PathBuf;

use super::CommandError;

/// Load ingredient reference data from a JSON array of
/// `{"name": ..., "measurement_unit": ...}` objects
#[derive(Debug, Parser)]
pub struct ImportCommand {
    pub file: PathBuf,
}

pub fn run(args: ImportCommand) -> Result<(), CommandError> {
    let config = super::setup()?;

    let contents = std::fs::read_to_string(&args.file)
        .change_context(CommandError)
        .attach_printable_lazy(|| format!("could not read {}", args.file.display()))?;

    let ingredients = serde_json::from_str::<Vec<NewIngredient>>(&contents)
        .change_context(CommandError)
        .attach_printable("expected a JSON array of ingredients")?;

    super::runtime(None)?.block_on(async move {
        let app = super::connect(config).await?;
        let inserted = ImportIngredients { ingredients }
            .perform(&app)
            .await
            .map_err(|e| e.into_report().change_context(CommandError))?;

        tracing::info!(inserted, "imported ingredients");
        Ok::<_, Report<CommandError>>(())
    })
}
