use clap::Parser;
use error_stack::{Result, ResultExt};
use foodgram::http::Jwt;
use foodgram::types::id::{marker::UserMarker, Id};
use std::num::NonZeroU64;

use super::CommandError;

/// Issue a bearer token for a user, mainly for local testing
#[derive(Debug, Parser)]
pub struct TokenCommand {
    #[clap(long)]
    pub user_id: NonZeroU64,
    /// Overrides `auth.token_ttl_secs`.
    #[clap(long)]
    pub ttl_secs: Option<u64>,
}

pub fn run(args: TokenCommand) -> Result<(), CommandError> {
    let config = super::setup()?;
    let ttl = args.ttl_secs.unwrap_or(config.auth.token_ttl_secs);
    let user_id = Id::<UserMarker>::from_nonzero(args.user_id);

    let token = Jwt::new(user_id, ttl)
        .encode(&config.auth)
        .change_context(CommandError)?;

    println!("{token}");
    Ok(())
}
