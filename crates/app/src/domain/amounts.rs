//! Money column conversion
//!
//! Amounts are `u64` minor units in Rust and `BIGINT` in storage. Values cross the
//! boundary here so a negative column or an oversized amount surfaces as a decode
//! error instead of wrapping.

use rusty_money::{Money, iso};
use sqlx::{Row, error::DatabaseError, postgres::PgRow};

/// `numeric_value_out_of_range`, raised when SQL arithmetic leaves `BIGINT`.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn try_get_optional_amount(row: &PgRow, col: &str) -> Result<Option<u64>, sqlx::Error> {
    row.try_get::<Option<i64>, _>(col)?
        .map(|amount_i64| {
            u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
                index: col.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}

pub(crate) fn to_column_amount(col: &str, amount: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Whether `amount` can be stored in a `BIGINT` column.
pub(crate) fn fits_column(amount: u64) -> bool {
    i64::try_from(amount).is_ok()
}

/// Whether storage refused a value because it left the `BIGINT` range.
pub(crate) fn is_out_of_range(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(DatabaseError::code)
        .is_some_and(|code| code == NUMERIC_VALUE_OUT_OF_RANGE)
}

/// Human readable amount for ledger descriptions, e.g. `$90.00`.
pub(crate) fn display_amount(amount: u64) -> String {
    match i64::try_from(amount) {
        Ok(minor) => Money::from_minor(minor, iso::USD).to_string(),
        Err(_) => format!("{amount} minor units"),
    }
}
