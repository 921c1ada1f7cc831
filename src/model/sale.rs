use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::money::Money;

/// Revenue category of a completed sale line.
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
pub enum SaleKind {
    Service,
    Product,
}

/// Per-staff revenue totals for one period. Derived by the aggregator from
/// `completed_sales`; never persisted on its own.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct SalesSummary {
    pub service_revenue_cents: i64,
    pub product_revenue_cents: i64,
    pub sales_count: i64,
}

impl SalesSummary {
    pub fn service_revenue(&self) -> Money {
        Money::from_cents(self.service_revenue_cents)
    }

    pub fn product_revenue(&self) -> Money {
        Money::from_cents(self.product_revenue_cents)
    }

    pub fn total_sales(&self) -> Money {
        self.service_revenue() + self.product_revenue()
    }
}
