//! Purchases Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashSet;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use storefront_core::{cart::CartLine, checkout::Settlement};
use uuid::Uuid;

use crate::domain::{
    amounts::{to_column_amount, try_get_amount},
    checkout::records::{PurchaseItemRecord, PurchaseItemUuid, PurchaseRecord, PurchaseUuid},
    discounts::records::DiscountCodeUuid,
    games::records::GameUuid,
    users::records::UserUuid,
};

const CREATE_PURCHASE_SQL: &str = include_str!("../sql/create_purchase.sql");
const CREATE_PURCHASE_ITEMS_SQL: &str = include_str!("../sql/create_purchase_items.sql");
const MARK_OWNED_SQL: &str = include_str!("../sql/mark_owned.sql");
const OWNED_GAMES_SQL: &str = include_str!("../sql/owned_games.sql");
const LIST_PURCHASES_SQL: &str = include_str!("../sql/list_purchases.sql");
const LIST_PURCHASE_ITEMS_SQL: &str = include_str!("../sql/list_purchase_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPurchasesRepository;

impl PgPurchasesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_purchase(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        purchase: PurchaseUuid,
        user: UserUuid,
        settlement: &Settlement,
        discount_code: Option<DiscountCodeUuid>,
    ) -> Result<PurchaseRecord, sqlx::Error> {
        query_as::<Postgres, PurchaseRecord>(CREATE_PURCHASE_SQL)
            .bind(purchase.into_uuid())
            .bind(user.into_uuid())
            .bind(to_column_amount("total_amount", settlement.total)?)
            .bind(to_column_amount("discount_amount", settlement.discount_amount)?)
            .bind(to_column_amount("final_amount", settlement.final_amount)?)
            .bind(discount_code.map(DiscountCodeUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert one item per cart line at the line's current unit price.
    pub(crate) async fn create_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        purchase: PurchaseUuid,
        lines: &[CartLine],
    ) -> Result<Vec<PurchaseItemRecord>, sqlx::Error> {
        let mut uuids = Vec::with_capacity(lines.len());
        let mut games = Vec::with_capacity(lines.len());
        let mut quantities = Vec::with_capacity(lines.len());
        let mut prices = Vec::with_capacity(lines.len());

        for line in lines {
            uuids.push(PurchaseItemUuid::new().into_uuid());
            games.push(line.game);
            quantities.push(to_column_quantity(line.quantity)?);
            prices.push(to_column_amount("price_at_purchase", line.unit_price)?);
        }

        query_as::<Postgres, PurchaseItemRecord>(CREATE_PURCHASE_ITEMS_SQL)
            .bind(purchase.into_uuid())
            .bind(uuids)
            .bind(games)
            .bind(quantities)
            .bind(prices)
            .fetch_all(&mut **tx)
            .await
    }

    /// Record the user as owning `games`.
    pub(crate) async fn mark_owned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        purchase: PurchaseUuid,
        games: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_OWNED_SQL)
            .bind(user.into_uuid())
            .bind(purchase.into_uuid())
            .bind(games)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Which of `games` the user already owns.
    pub(crate) async fn owned_games(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        games: &[Uuid],
    ) -> Result<FxHashSet<Uuid>, sqlx::Error> {
        let owned: Vec<Uuid> = query_scalar(OWNED_GAMES_SQL)
            .bind(user.into_uuid())
            .bind(games)
            .fetch_all(&mut **tx)
            .await?;

        Ok(owned.into_iter().collect())
    }

    /// The user's purchases, newest first.
    pub(crate) async fn list_purchases(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<PurchaseRecord>, sqlx::Error> {
        query_as::<Postgres, PurchaseRecord>(LIST_PURCHASES_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        purchases: &[Uuid],
    ) -> Result<Vec<PurchaseItemRecord>, sqlx::Error> {
        query_as::<Postgres, PurchaseItemRecord>(LIST_PURCHASE_ITEMS_SQL)
            .bind(purchases)
            .fetch_all(&mut **tx)
            .await
    }
}

fn to_column_quantity(quantity: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
        index: "quantity".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for PurchaseRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PurchaseUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            total: try_get_amount(row, "total_amount")?,
            discount_amount: try_get_amount(row, "discount_amount")?,
            final_amount: try_get_amount(row, "final_amount")?,
            discount_code: row
                .try_get::<Option<Uuid>, _>("discount_code_uuid")?
                .map(DiscountCodeUuid::from_uuid),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PurchaseItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i32 = row.try_get("quantity")?;

        Ok(Self {
            uuid: PurchaseItemUuid::from_uuid(row.try_get("uuid")?),
            purchase: PurchaseUuid::from_uuid(row.try_get::<Uuid, _>("purchase_uuid")?),
            game: GameUuid::from_uuid(row.try_get::<Uuid, _>("game_uuid")?),
            quantity: u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
                index: "quantity".to_string(),
                source: Box::new(e),
            })?,
            price_at_purchase: try_get_amount(row, "price_at_purchase")?,
        })
    }
}
