use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::config::Config;
use crate::directory;
use crate::error::ApiError;
use crate::money::Money;
use crate::period::month_bounds;

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct TopPerformer {
    #[schema(example = 1)]
    pub staff_id: i64,

    #[schema(example = "Carlos")]
    pub staff_name: String,

    pub total_sales_cents: i64,

    pub net_payable_cents: i64,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub total_staff: i64,

    #[schema(value_type = String, format = "date")]
    pub period_start: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub period_end: NaiveDate,

    pub total_commissions_cents: i64,
    pub total_paid_cents: i64,
    pub total_pending_cents: i64,

    /// Share of this month's commissions already paid out, 0-100.
    #[schema(example = 42.5)]
    pub percent_paid: f64,

    /// Ranked by total sales descending, ties broken by staff id ascending.
    pub top_performers: Vec<TopPerformer>,
}

/// Current-month payout dashboard.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, body = DashboardResponse)),
    tag = "Dashboard"
)]
pub async fn dashboard(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let (start, end) = month_bounds(Utc::now().date_naive());

    let total_staff = directory::active_staff_count(pool.get_ref()).await?;

    // Paid and pending totals for payouts whose period lies in this month.
    let buckets = sqlx::query_as::<_, (bool, i64)>(
        "SELECT paid, COALESCE(SUM(net_payable_cents), 0) \
         FROM payout_calculations \
         WHERE period_start >= ? AND period_end <= ? \
         GROUP BY paid",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool.get_ref())
    .await?;

    let mut total_paid = Money::zero();
    let mut total_pending = Money::zero();
    for (paid, cents) in buckets {
        if paid {
            total_paid += Money::from_cents(cents);
        } else {
            total_pending += Money::from_cents(cents);
        }
    }
    let total_commissions = total_paid + total_pending;

    let percent_paid = if total_commissions.cents() != 0 {
        total_paid.cents() as f64 / total_commissions.cents() as f64 * 100.0
    } else {
        0.0
    };

    // One entry per staff member even when several periods of the month were
    // calculated separately.
    let top_performers = sqlx::query_as::<_, TopPerformer>(
        "SELECT p.staff_id, s.name AS staff_name, \
                SUM(p.total_sales_cents) AS total_sales_cents, \
                SUM(p.net_payable_cents) AS net_payable_cents \
         FROM payout_calculations p \
         JOIN staff s ON s.id = p.staff_id \
         WHERE p.period_start >= ? AND p.period_end <= ? \
         GROUP BY p.staff_id \
         ORDER BY total_sales_cents DESC, p.staff_id ASC \
         LIMIT ?",
    )
    .bind(start)
    .bind(end)
    .bind(config.top_performers_limit as i64)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(DashboardResponse {
        total_staff,
        period_start: start,
        period_end: end,
        total_commissions_cents: total_commissions.cents(),
        total_paid_cents: total_paid.cents(),
        total_pending_cents: total_pending.cents(),
        percent_paid,
        top_performers,
    }))
}
