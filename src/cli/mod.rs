use clap::Parser;
use error_stack::{Result, ResultExt};
use thiserror::Error;

use foodgram::config::Server as Config;

mod import;
mod migrate;
mod server;
mod token;
mod users;

#[derive(Debug, Error)]
#[error("Failed to run command")]
pub struct CommandError;

/// Command line options for Foodgram.
#[derive(Debug, Parser)]
#[command(
    about = "Utility suite for the Foodgram backend",
    version,
    author,
    long_about
)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Cli {
    pub fn run(self) -> Result<(), CommandError> {
        match self.subcommand {
            Subcommand::Server(args) => self::server::run(args),
            Subcommand::Migrate(args) => self::migrate::run(args),
            Subcommand::Token(args) => self::token::run(args),
            Subcommand::ImportIngredients(args) => self::import::run(args),
            Subcommand::CreateUser(args) => self::users::run(args),
        }
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    Server(self::server::ServerCommand),
    Migrate(self::migrate::MigrateCommand),
    Token(self::token::TokenCommand),
    ImportIngredients(self::import::ImportCommand),
    CreateUser(self::users::CreateUserCommand),
}

/// Loads the configuration and installs logging.
fn setup() -> Result<Config, CommandError> {
    let config = Config::load().change_context(CommandError)?;
    foodgram::logging::init(&config.logging).change_context(CommandError)?;
    Ok(config)
}

fn runtime(workers: Option<usize>) -> Result<tokio::runtime::Runtime, CommandError> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if let Some(workers) = workers {
        builder.worker_threads(workers);
    }
    builder
        .enable_all()
        .build()
        .change_context(CommandError)
        .attach_printable("could not build tokio runtime")
}

/// Connects to the configured database.
async fn connect(config: Config) -> Result<foodgram::App, CommandError> {
    foodgram::App::new(config).await.change_context(CommandError)
}
