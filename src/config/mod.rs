use thiserror::Error;

mod database;
mod logging;
mod server;

pub use database::{Database, DbPoolConfig};
pub use logging::{InvalidLoggingStyle, Logging, LoggingStyle};
pub use server::{Auth, Server, Shopping};

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;
