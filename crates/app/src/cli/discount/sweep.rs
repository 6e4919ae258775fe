use clap::Args;
use jiff::Timestamp;
use storefront_app::{
    database::Db,
    domain::discounts::{DiscountSweeper, PgDiscountSweeper},
};

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct SweepArgs {
    #[command(flatten)]
    database: DatabaseArgs,
}

pub(crate) async fn run(args: SweepArgs) -> Result<(), String> {
    let db = Db::new(args.database.connect().await?);

    let report = PgDiscountSweeper::new(db)
        .sweep_once(Timestamp::now())
        .await
        .map_err(|error| format!("sweep failed: {error}"))?;

    println!("examined: {}", report.examined);
    println!("deactivated: {}", report.deactivated);
    println!("failed: {}", report.failed);

    Ok(())
}
