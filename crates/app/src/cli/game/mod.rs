use clap::{Args, Subcommand};

mod create;

#[derive(Debug, Args)]
pub(crate) struct GameCommand {
    #[command(subcommand)]
    command: GameSubcommand,
}

#[derive(Debug, Subcommand)]
enum GameSubcommand {
    Create(create::CreateGameArgs),
}

pub(crate) async fn run(command: GameCommand) -> Result<(), String> {
    match command.command {
        GameSubcommand::Create(args) => create::run(args).await,
    }
}
