//! Discount code partial updates
//!
//! Builds the `UPDATE` statement for a [`DiscountCodeUpdate`], touching only the
//! columns the patch sets.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, QueryBuilder};

use crate::domain::{
    amounts::to_column_amount,
    discounts::{
        data::DiscountCodeUpdate,
        records::DiscountCodeUuid,
        repository::{DISCOUNT_CODE_COLUMNS, kind_columns},
    },
};

pub(crate) fn build_update(
    code: DiscountCodeUuid,
    update: &DiscountCodeUpdate,
) -> Result<QueryBuilder<'static, Postgres>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE discount_codes SET ");

    {
        let mut set = builder.separated(", ");

        if let Some(value) = &update.code {
            set.push("code = ").push_bind_unseparated(value.clone());
        }

        // kind and its value columns always move together
        if let Some(kind) = &update.kind {
            let (kind, percentage, amount) = kind_columns(kind)?;

            set.push("kind = ").push_bind_unseparated(kind);
            set.push("discount_percentage = ")
                .push_bind_unseparated(percentage);
            set.push("discount_amount = ").push_bind_unseparated(amount);
        }

        if let Some(min_total) = update.min_total {
            set.push("min_total = ")
                .push_bind_unseparated(to_column_amount("min_total", min_total)?);
        }

        if let Some(starts_at) = update.starts_at {
            set.push("starts_at = ")
                .push_bind_unseparated(starts_at.map(SqlxTimestamp::from));
        }

        if let Some(ends_at) = update.ends_at {
            set.push("ends_at = ")
                .push_bind_unseparated(ends_at.map(SqlxTimestamp::from));
        }

        if let Some(usage_limit) = update.usage_limit {
            let usage_limit = usage_limit
                .map(|limit| to_column_amount("usage_limit", limit))
                .transpose()?;

            set.push("usage_limit = ").push_bind_unseparated(usage_limit);
        }

        if let Some(single_use_per_user) = update.single_use_per_user {
            set.push("single_use_per_user = ")
                .push_bind_unseparated(single_use_per_user);
        }

        if let Some(active) = update.active {
            set.push("active = ").push_bind_unseparated(active);
        }

        set.push("updated_at = now()");
    }

    builder.push(" WHERE uuid = ");
    builder.push_bind(code.into_uuid());
    builder.push(" RETURNING ");
    builder.push(DISCOUNT_CODE_COLUMNS);

    Ok(builder)
}
