use clap::{Args, Parser, Subcommand};
use sqlx::PgPool;
use storefront_app::database;

mod db;
mod discount;
mod game;
mod user;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    User(user::UserCommand),
    Game(game::GameCommand),
    Discount(discount::DiscountCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::User(command) => user::run(command).await,
            Commands::Game(command) => game::run(command).await,
            Commands::Discount(command) => discount::run(command).await,
        }
    }
}

/// Connection flags shared by every subcommand.
#[derive(Debug, Args)]
pub(crate) struct DatabaseArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

impl DatabaseArgs {
    pub(crate) async fn connect(&self) -> Result<PgPool, String> {
        database::connect(&self.database_url, 1)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))
    }
}
