use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::money::Money;

/// Manual, non-sales-driven change to a payout.
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
pub enum AdjustmentKind {
    /// Reduces the amount to pay.
    Discount,
    /// Money already disbursed outside this cycle; reduces what is still owed.
    Advance,
    /// Additional amount to pay.
    Bonus,
    /// Reduction applied as a sanction.
    Penalty,
}

impl AdjustmentKind {
    /// Contribution of an entry of this kind to the net payable amount.
    /// Only a bonus adds; discount, advance and penalty all subtract.
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            AdjustmentKind::Bonus => amount,
            AdjustmentKind::Discount | AdjustmentKind::Advance | AdjustmentKind::Penalty => {
                -amount
            }
        }
    }
}

/// One immutable ledger entry. The ledger is append-only: correcting a
/// mistake requires a compensating entry of the opposite kind.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": "7f8e2c1a-3b4d-4e5f-9a0b-1c2d3e4f5a6b",
    "staff_id": 1,
    "kind": "advance",
    "description": "Advance for week 32",
    "amount_cents": 10000,
    "effective_date": "2026-08-10",
    "created_at": "2026-08-10T09:30:00Z"
}))]
pub struct AdjustmentEntry {
    pub id: String,

    #[schema(example = 1)]
    pub staff_id: i64,

    pub kind: AdjustmentKind,

    #[schema(example = "Advance for week 32")]
    pub description: String,

    /// Always positive; the kind determines the sign.
    #[schema(example = 10000)]
    pub amount_cents: i64,

    #[schema(value_type = String, format = "date")]
    pub effective_date: NaiveDate,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bonus_increases_the_payout() {
        let amount = Money::from_cents(100);
        assert_eq!(AdjustmentKind::Bonus.signed(amount).cents(), 100);
        assert_eq!(AdjustmentKind::Discount.signed(amount).cents(), -100);
        assert_eq!(AdjustmentKind::Advance.signed(amount).cents(), -100);
        assert_eq!(AdjustmentKind::Penalty.signed(amount).cents(), -100);
    }

    #[test]
    fn kind_round_trips_through_snake_case() {
        use std::str::FromStr;
        assert_eq!(AdjustmentKind::Advance.to_string(), "advance");
        assert_eq!(
            AdjustmentKind::from_str("penalty").unwrap(),
            AdjustmentKind::Penalty
        );
    }
}
