//! Discount Code Requests

use std::str::FromStr;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{http::StatusError, oapi::ToSchema};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use storefront_app::domain::discounts::data::{DiscountCodeUpdate, NewDiscountCode};
use storefront_core::discounts::{DiscountKind, DiscountRules, MAX_PERCENTAGE_SCALE};

/// How a discount code reduces the order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DiscountType {
    /// `discount_value` is a percentage such as `"12.5"`
    Percent,

    /// `discount_value` is an amount in minor units such as `"500"`
    Fixed,
}

impl DiscountType {
    /// Split a kind into its wire type and value.
    pub(crate) fn split(kind: &DiscountKind) -> (Self, String) {
        match kind {
            DiscountKind::Percent { percentage } => (Self::Percent, percentage.normalize().to_string()),
            DiscountKind::Fixed { amount } => (Self::Fixed, amount.to_string()),
        }
    }

    pub(crate) fn parse_value(self, value: &str) -> Result<DiscountKind, StatusError> {
        let value = value.trim();

        match self {
            Self::Percent => {
                let percentage =
                    Decimal::from_str(value).map_err(|error| invalid("discount_value", &error))?;

                if percentage.normalize().scale() > MAX_PERCENTAGE_SCALE {
                    return Err(StatusError::bad_request()
                        .brief("Invalid discount_value")
                        .detail(format!(
                            "percentage allows at most {MAX_PERCENTAGE_SCALE} decimal places"
                        )));
                }

                Ok(DiscountKind::Percent { percentage })
            }
            Self::Fixed => value
                .parse::<u64>()
                .map(|amount| DiscountKind::Fixed { amount })
                .map_err(|error| invalid("discount_value", &error)),
        }
    }
}

fn invalid(field: &str, error: &dyn std::error::Error) -> StatusError {
    StatusError::bad_request()
        .brief(format!("Invalid {field}"))
        .detail(error.to_string())
}

fn parse_timestamp(field: &str, value: &str) -> Result<Timestamp, StatusError> {
    value.trim().parse().map_err(|error| invalid(field, &error))
}

/// Tell an explicit `null` (`Some(None)`) apart from an absent field (`None`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

const fn default_active() -> bool {
    true
}

/// Create Discount Code Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateDiscountCodeRequest {
    pub uuid: Uuid,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: String,

    /// Minimum order total in minor units
    #[serde(default)]
    pub min_total: u64,

    /// RFC 3339 start of the validity window
    #[serde(default)]
    pub starts_at: Option<String>,

    /// RFC 3339 end of the validity window
    #[serde(default)]
    pub ends_at: Option<String>,

    /// Maximum redemptions across all users
    #[serde(default)]
    pub usage_limit: Option<u64>,

    #[serde(default)]
    pub single_use_per_user: bool,

    #[serde(default = "default_active")]
    pub active: bool,
}

impl TryFrom<CreateDiscountCodeRequest> for NewDiscountCode {
    type Error = StatusError;

    fn try_from(request: CreateDiscountCodeRequest) -> Result<Self, Self::Error> {
        let kind = request.discount_type.parse_value(&request.discount_value)?;

        Ok(NewDiscountCode {
            uuid: request.uuid.into(),
            code: request.code,
            rules: DiscountRules {
                kind,
                min_total: request.min_total,
                starts_at: request
                    .starts_at
                    .as_deref()
                    .map(|value| parse_timestamp("starts_at", value))
                    .transpose()?,
                ends_at: request
                    .ends_at
                    .as_deref()
                    .map(|value| parse_timestamp("ends_at", value))
                    .transpose()?,
                usage_limit: request.usage_limit,
                single_use_per_user: request.single_use_per_user,
            },
            active: request.active,
        })
    }
}

/// Update Discount Code Request
///
/// Absent fields are left unchanged. `null` clears `starts_at`, `ends_at` and
/// `usage_limit`.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateDiscountCodeRequest {
    #[serde(default)]
    pub code: Option<String>,

    /// Must be sent together with `discount_value`
    #[serde(default)]
    pub discount_type: Option<DiscountType>,

    #[serde(default)]
    pub discount_value: Option<String>,

    #[serde(default)]
    pub min_total: Option<u64>,

    #[serde(default, deserialize_with = "nullable")]
    pub starts_at: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    pub ends_at: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    pub usage_limit: Option<Option<u64>>,

    #[serde(default)]
    pub single_use_per_user: Option<bool>,

    /// Setting an inactive code active clears its redemption history
    #[serde(default)]
    pub active: Option<bool>,
}

fn nullable_timestamp(
    field: &str,
    value: Option<Option<String>>,
) -> Result<Option<Option<Timestamp>>, StatusError> {
    value
        .map(|value| {
            value
                .as_deref()
                .map(|value| parse_timestamp(field, value))
                .transpose()
        })
        .transpose()
}

impl TryFrom<UpdateDiscountCodeRequest> for DiscountCodeUpdate {
    type Error = StatusError;

    fn try_from(request: UpdateDiscountCodeRequest) -> Result<Self, Self::Error> {
        let kind = match (request.discount_type, request.discount_value.as_deref()) {
            (Some(discount_type), Some(value)) => Some(discount_type.parse_value(value)?),
            (None, None) => None,
            _ => {
                return Err(StatusError::bad_request()
                    .brief("discount_type and discount_value must be sent together"));
            }
        };

        Ok(DiscountCodeUpdate {
            code: request.code,
            kind,
            min_total: request.min_total,
            starts_at: nullable_timestamp("starts_at", request.starts_at)?,
            ends_at: nullable_timestamp("ends_at", request.ends_at)?,
            usage_limit: request.usage_limit,
            single_use_per_user: request.single_use_per_user,
            active: request.active,
        })
    }
}
