use clap::Parser;
use error_stack::{Report, Result};
use foodgram::services::users::CreateUser;
use foodgram::types::form::users::CreateUser as CreateUserForm;

use super::CommandError;

/// Create a user account
#[derive(Debug, Parser)]
pub struct CreateUserCommand {
    #[clap(long)]
    pub email: String,
    #[clap(long)]
    pub username: String,
    #[clap(long)]
    pub first_name: String,
    #[clap(long)]
    pub last_name: String,
    #[clap(long)]
    pub admin: bool,
}

pub fn run(args: CreateUserCommand) -> Result<(), CommandError> {
    let config = super::setup()?;
    let form = CreateUserForm {
        email: args.email,
        username: args.username,
        first_name: args.first_name,
        last_name: args.last_name,
        is_admin: args.admin,
    };

    super::runtime(None)?.block_on(async move {
        let app = super::connect(config).await?;
        let user = CreateUser { form }
            .perform(&app)
            .await
            .map_err(|e| e.into_report().change_context(CommandError))?;

        println!("{}", user.id);
        Ok::<_, Report<CommandError>>(())
    })
}
