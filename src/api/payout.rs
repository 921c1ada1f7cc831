use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use crate::engine;
use crate::error::ApiError;
use crate::model::payout::PayoutCalculation;
use crate::money::Money;
use crate::period::ReportPreset;

#[derive(Deserialize, ToSchema)]
pub struct CalculateRequest {
    /// Omit to calculate for all active staff.
    #[schema(example = 1)]
    pub staff_id: Option<i64>,

    #[schema(value_type = String, format = "date", example = "2026-08-01")]
    pub period_start: NaiveDate,

    #[schema(value_type = String, format = "date", example = "2026-08-31")]
    pub period_end: NaiveDate,
}

#[derive(Serialize, ToSchema)]
pub struct StaffError {
    pub code: String,
    pub message: String,
}

/// Per-staff entry of a calculation batch: either the payout or the reason
/// this staff member failed. The batch itself never fails wholesale on a
/// per-staff error.
#[derive(Serialize, ToSchema)]
pub struct StaffResult {
    pub staff_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout: Option<PayoutCalculation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StaffError>,
}

#[derive(Serialize, ToSchema)]
pub struct CalculateResponse {
    #[schema(value_type = String, format = "date")]
    pub period_start: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub period_end: NaiveDate,
    pub results: Vec<StaffResult>,
}

/// Run the payout calculation for a period.
#[utoipa::path(
    post,
    path = "/payouts/calculate",
    request_body = CalculateRequest,
    responses(
        (status = 200, description = "Per-staff calculation results", body = CalculateResponse),
        (status = 400, description = "Invalid period"),
        (status = 404, description = "Unknown staff filter")
    ),
    tag = "Payouts"
)]
pub async fn calculate(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CalculateRequest>,
) -> Result<HttpResponse, ApiError> {
    let outcomes = engine::calculate(
        pool.get_ref(),
        payload.staff_id,
        payload.period_start,
        payload.period_end,
    )
    .await?;

    let results = outcomes
        .into_iter()
        .map(|o| match o.result {
            Ok(payout) => StaffResult {
                staff_id: o.staff_id,
                payout: Some(payout),
                error: None,
            },
            Err(e) => StaffResult {
                staff_id: o.staff_id,
                payout: None,
                error: Some(StaffError {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }),
            },
        })
        .collect();

    Ok(HttpResponse::Ok().json(CalculateResponse {
        period_start: payload.period_start,
        period_end: payload.period_end,
        results,
    }))
}

#[derive(Deserialize, ToSchema)]
pub struct MarkPaidRequest {
    #[schema(value_type = String, format = "date", example = "2026-09-01")]
    pub paid_date: NaiveDate,
}

/// Mark a pending payout as paid. Terminal: there is no reverse transition.
#[utoipa::path(
    post,
    path = "/payouts/{payout_id}/mark-paid",
    params(("payout_id", description = "Payout calculation ID")),
    request_body = MarkPaidRequest,
    responses(
        (status = 200, description = "Payout marked paid", body = PayoutCalculation),
        (status = 400, description = "Paid date precedes period end"),
        (status = 404, description = "Payout not found"),
        (status = 409, description = "Already paid")
    ),
    tag = "Payouts"
)]
pub async fn mark_paid(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    payload: web::Json<MarkPaidRequest>,
) -> Result<HttpResponse, ApiError> {
    let payout_id = path.into_inner();
    let payout = engine::mark_paid(pool.get_ref(), &payout_id, payload.paid_date).await?;
    Ok(HttpResponse::Ok().json(payout))
}

/// Fetch a stored payout calculation.
#[utoipa::path(
    get,
    path = "/payouts/{payout_id}",
    params(("payout_id", description = "Payout calculation ID")),
    responses(
        (status = 200, body = PayoutCalculation),
        (status = 404, description = "Payout not found")
    ),
    tag = "Payouts"
)]
pub async fn get_payout(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let payout = engine::get_payout(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payout))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    /// day, week or month; defaults to month.
    #[param(example = "month")]
    pub period: Option<String>,

    #[param(example = 1)]
    pub staff_id: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct ReportSummary {
    pub total_sales_cents: i64,
    pub total_commissions_cents: i64,
    pub total_paid_cents: i64,
    pub total_pending_cents: i64,
    /// Decimal currency notation, display only.
    #[schema(example = "560.00")]
    pub total_commissions_display: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    pub period: ReportPreset,
    #[schema(value_type = String, format = "date")]
    pub period_start: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub period_end: NaiveDate,
    pub summary: ReportSummary,
    pub calculations: Vec<PayoutCalculation>,
}

/// Payout report for a preset period (today, current week or current month),
/// optionally restricted to one staff member.
#[utoipa::path(
    get,
    path = "/payouts/report",
    params(ReportQuery),
    responses(
        (status = 200, body = ReportResponse),
        (status = 400, description = "Unknown period preset")
    ),
    tag = "Payouts"
)]
pub async fn report(
    pool: web::Data<SqlitePool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    let preset = match query.period.as_deref() {
        None => ReportPreset::Month,
        Some(raw) => ReportPreset::from_str(raw).map_err(|_| {
            ApiError::Validation(format!("unknown period preset: {raw}"))
        })?,
    };
    let (start, end) = preset.resolve(Utc::now().date_naive());

    let mut sql = String::from(
        "SELECT id, staff_id, period_start, period_end, total_sales_cents, \
                service_commission_cents, product_commission_cents, rental_deduction_cents, \
                goal_bonus_cents, ledger_adjustment_cents, net_payable_cents, paid, \
                paid_date, calculated_at \
         FROM payout_calculations \
         WHERE period_start >= ? AND period_end <= ?",
    );
    if query.staff_id.is_some() {
        sql.push_str(" AND staff_id = ?");
    }
    sql.push_str(" ORDER BY staff_id");

    let mut q = sqlx::query_as::<_, PayoutCalculation>(&sql).bind(start).bind(end);
    if let Some(id) = query.staff_id {
        q = q.bind(id);
    }
    let calculations = q.fetch_all(pool.get_ref()).await?;

    let total_sales: Money = calculations
        .iter()
        .map(|c| Money::from_cents(c.total_sales_cents))
        .sum();
    let total_commissions: Money = calculations
        .iter()
        .map(|c| Money::from_cents(c.net_payable_cents))
        .sum();
    let total_paid: Money = calculations
        .iter()
        .filter(|c| c.paid)
        .map(|c| Money::from_cents(c.net_payable_cents))
        .sum();

    let summary = ReportSummary {
        total_sales_cents: total_sales.cents(),
        total_commissions_cents: total_commissions.cents(),
        total_paid_cents: total_paid.cents(),
        total_pending_cents: (total_commissions - total_paid).cents(),
        total_commissions_display: total_commissions.to_string(),
    };

    Ok(HttpResponse::Ok().json(ReportResponse {
        period: preset,
        period_start: start,
        period_end: end,
        summary,
        calculations,
    }))
}
