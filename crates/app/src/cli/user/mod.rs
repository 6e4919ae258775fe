use clap::{Args, Subcommand};

mod create;
mod deposit;

#[derive(Debug, Args)]
pub(crate) struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    /// Create a user and print a session token for it
    Create(create::CreateUserArgs),

    /// Credit a user's wallet
    Deposit(deposit::DepositArgs),
}

pub(crate) async fn run(command: UserCommand) -> Result<(), String> {
    match command.command {
        UserSubcommand::Create(args) => create::run(args).await,
        UserSubcommand::Deposit(args) => deposit::run(args).await,
    }
}
