use clap::Args;
use storefront_app::{
    database::Db,
    domain::users::{PgUsersService, UsersService, records::UserUuid},
};
use uuid::Uuid;

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct DepositArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// User to credit
    #[arg(long)]
    user_uuid: Uuid,

    /// Amount in minor units
    #[arg(long)]
    amount: u64,
}

pub(crate) async fn run(args: DepositArgs) -> Result<(), String> {
    let db = Db::new(args.database.connect().await?);

    let receipt = PgUsersService::new(db)
        .deposit(UserUuid::from_uuid(args.user_uuid), args.amount)
        .await
        .map_err(|error| format!("failed to deposit: {error}"))?;

    println!("transaction_uuid: {}", receipt.transaction.uuid);
    println!("balance: {}", receipt.balance);

    Ok(())
}
