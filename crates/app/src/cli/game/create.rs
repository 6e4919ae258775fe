use clap::Args;
use storefront_app::{
    database::Db,
    domain::games::{GamesService, PgGamesService, data::NewGame, records::GameUuid},
};

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct CreateGameArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Game title
    #[arg(long)]
    title: String,

    /// Price in minor units
    #[arg(long)]
    price: u64,
}

pub(crate) async fn run(args: CreateGameArgs) -> Result<(), String> {
    let db = Db::new(args.database.connect().await?);

    let game = PgGamesService::new(db)
        .create_game(NewGame {
            uuid: GameUuid::new(),
            title: args.title,
            price: args.price,
        })
        .await
        .map_err(|error| format!("failed to create game: {error}"))?;

    println!("game_uuid: {}", game.uuid);
    println!("title: {}", game.title);
    println!("price: {}", game.price);

    Ok(())
}
