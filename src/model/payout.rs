use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A computed payout for one staff member and one inclusive period.
///
/// The engine creates and overwrites rows while `paid` is false; the state
/// machine alone flips `paid`. Once paid, the row is frozen: recalculation
/// for the same key is rejected and there is no reverse transition. The `id`
/// stays stable across recalculation of an unpaid period.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": "a1b2c3d4-0000-4e5f-9a0b-1c2d3e4f5a6b",
    "staff_id": 1,
    "period_start": "2026-08-01",
    "period_end": "2026-08-31",
    "total_sales_cents": 120000,
    "service_commission_cents": 50000,
    "product_commission_cents": 6000,
    "rental_deduction_cents": 0,
    "goal_bonus_cents": 0,
    "ledger_adjustment_cents": -10000,
    "net_payable_cents": 46000,
    "paid": false,
    "paid_date": null,
    "calculated_at": "2026-08-31T18:00:00Z"
}))]
pub struct PayoutCalculation {
    pub id: String,

    #[schema(example = 1)]
    pub staff_id: i64,

    #[schema(value_type = String, format = "date")]
    pub period_start: NaiveDate,

    #[schema(value_type = String, format = "date")]
    pub period_end: NaiveDate,

    /// Service plus product revenue for the period.
    pub total_sales_cents: i64,

    pub service_commission_cents: i64,

    pub product_commission_cents: i64,

    /// Recorded for reporting only; already netted into the service
    /// commission for chair-rental policies.
    pub rental_deduction_cents: i64,

    pub goal_bonus_cents: i64,

    /// Signed sum of the period's ledger entries.
    pub ledger_adjustment_cents: i64,

    /// May be negative (staff member owes the business); never clamped.
    pub net_payable_cents: i64,

    pub paid: bool,

    #[schema(value_type = Option<String>, format = "date")]
    pub paid_date: Option<NaiveDate>,

    #[schema(value_type = String, format = "date-time")]
    pub calculated_at: DateTime<Utc>,
}
