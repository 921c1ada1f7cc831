use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// How a staff member's commission is computed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CommissionType {
    /// Percentage of service and product revenue.
    Percentage,
    /// Flat monthly amount plus a percentage of product revenue.
    FixedMonthly,
    /// Staff member keeps service revenue minus a fixed chair rental.
    ChairRental,
}

/// The single active compensation policy for a staff member.
///
/// Upserts replace the prior row; there is no policy history. A calculation
/// always uses the policy in effect at calculation time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "staff_id": 1,
    "commission_type": "percentage",
    "service_percent": 50,
    "product_percent": 30,
    "chair_rental_cents": 0,
    "fixed_monthly_cents": 0,
    "monthly_goal_cents": 500000,
    "goal_bonus_percent": 5,
    "updated_at": "2026-08-01T12:00:00Z"
}))]
pub struct CompensationPolicy {
    #[schema(example = 1)]
    pub staff_id: i64,

    pub commission_type: CommissionType,

    /// 0-100, meaningful for percentage and chair_rental types.
    #[schema(example = 50)]
    pub service_percent: i64,

    /// 0-100, meaningful for all types.
    #[schema(example = 30)]
    pub product_percent: i64,

    /// Required > 0 when commission_type = chair_rental.
    #[schema(example = 0)]
    pub chair_rental_cents: i64,

    #[schema(example = 0)]
    pub fixed_monthly_cents: i64,

    /// Sales target that unlocks the goal bonus; 0 disables it.
    #[schema(example = 500000)]
    pub monthly_goal_cents: i64,

    /// 0-100, applied to total sales when the goal is reached.
    #[schema(example = 5)]
    pub goal_bonus_percent: i64,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}
