use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::directory;
use crate::error::ApiError;
use crate::model::adjustment::{AdjustmentEntry, AdjustmentKind};

#[derive(Deserialize, ToSchema)]
pub struct CreateAdjustment {
    #[schema(example = 1)]
    pub staff_id: i64,

    pub kind: AdjustmentKind,

    #[schema(example = "Advance for week 32")]
    pub description: String,

    /// Always positive; the kind determines the sign at calculation time.
    #[schema(example = 10000)]
    pub amount_cents: i64,

    #[schema(value_type = String, format = "date", example = "2026-08-10")]
    pub effective_date: NaiveDate,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LedgerQuery {
    #[param(example = 1)]
    pub staff_id: i64,

    #[param(value_type = String, format = "date")]
    pub start: NaiveDate,

    #[param(value_type = String, format = "date")]
    pub end: NaiveDate,
}

/// Append an entry to the adjustment ledger.
///
/// The ledger is append-only; there is no update or delete route. A wrong
/// entry is corrected with a compensating entry of the opposite kind.
#[utoipa::path(
    post,
    path = "/adjustments",
    request_body = CreateAdjustment,
    responses(
        (status = 201, description = "Entry appended", body = AdjustmentEntry),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Staff member not found")
    ),
    tag = "Adjustments"
)]
pub async fn create_adjustment(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateAdjustment>,
) -> Result<HttpResponse, ApiError> {
    if payload.amount_cents <= 0 {
        return Err(ApiError::Validation(
            "amount_cents must be positive".to_string(),
        ));
    }
    if payload.description.trim().is_empty() {
        return Err(ApiError::Validation(
            "description must not be empty".to_string(),
        ));
    }

    if !directory::staff_exists(pool.get_ref(), payload.staff_id).await? {
        return Err(ApiError::NotFound("staff member"));
    }

    let entry = AdjustmentEntry {
        id: Uuid::new_v4().to_string(),
        staff_id: payload.staff_id,
        kind: payload.kind,
        description: payload.description.trim().to_string(),
        amount_cents: payload.amount_cents,
        effective_date: payload.effective_date,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO adjustment_entries \
             (id, staff_id, kind, description, amount_cents, effective_date, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.id)
    .bind(entry.staff_id)
    .bind(entry.kind)
    .bind(&entry.description)
    .bind(entry.amount_cents)
    .bind(entry.effective_date)
    .bind(entry.created_at)
    .execute(pool.get_ref())
    .await?;

    info!(
        staff_id = entry.staff_id,
        kind = %entry.kind,
        amount_cents = entry.amount_cents,
        "ledger entry appended"
    );

    Ok(HttpResponse::Created().json(entry))
}

/// List ledger entries for a staff member within an inclusive period.
#[utoipa::path(
    get,
    path = "/adjustments",
    params(LedgerQuery),
    responses((status = 200, body = [AdjustmentEntry])),
    tag = "Adjustments"
)]
pub async fn list_adjustments(
    pool: web::Data<SqlitePool>,
    query: web::Query<LedgerQuery>,
) -> Result<HttpResponse, ApiError> {
    let entries = sqlx::query_as::<_, AdjustmentEntry>(
        "SELECT id, staff_id, kind, description, amount_cents, effective_date, created_at \
         FROM adjustment_entries \
         WHERE staff_id = ? AND effective_date >= ? AND effective_date <= ? \
         ORDER BY effective_date, created_at",
    )
    .bind(query.staff_id)
    .bind(query.start)
    .bind(query.end)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(entries))
}
