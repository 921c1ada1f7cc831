use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

use crate::directory;
use crate::error::ApiError;
use crate::model::policy::{CommissionType, CompensationPolicy};

#[derive(Deserialize, ToSchema)]
pub struct SetPolicy {
    #[schema(example = 1)]
    pub staff_id: i64,

    pub commission_type: CommissionType,

    #[serde(default)]
    #[schema(example = 50)]
    pub service_percent: i64,

    #[serde(default)]
    #[schema(example = 30)]
    pub product_percent: i64,

    #[serde(default)]
    #[schema(example = 0)]
    pub chair_rental_cents: i64,

    #[serde(default)]
    #[schema(example = 0)]
    pub fixed_monthly_cents: i64,

    #[serde(default)]
    #[schema(example = 500000)]
    pub monthly_goal_cents: i64,

    #[serde(default)]
    #[schema(example = 5)]
    pub goal_bonus_percent: i64,
}

fn validate(payload: &SetPolicy) -> Result<(), ApiError> {
    let percent_fields = [
        ("service_percent", payload.service_percent),
        ("product_percent", payload.product_percent),
        ("goal_bonus_percent", payload.goal_bonus_percent),
    ];
    for (name, value) in percent_fields {
        if !(0..=100).contains(&value) {
            return Err(ApiError::Validation(format!(
                "{name} must be between 0 and 100, got {value}"
            )));
        }
    }

    let amount_fields = [
        ("chair_rental_cents", payload.chair_rental_cents),
        ("fixed_monthly_cents", payload.fixed_monthly_cents),
        ("monthly_goal_cents", payload.monthly_goal_cents),
    ];
    for (name, value) in amount_fields {
        if value < 0 {
            return Err(ApiError::Validation(format!("{name} must not be negative")));
        }
    }

    if payload.commission_type == CommissionType::ChairRental && payload.chair_rental_cents == 0 {
        return Err(ApiError::Validation(
            "chair_rental_cents is required for chair_rental policies".to_string(),
        ));
    }

    Ok(())
}

/// Create or replace the compensation policy for a staff member.
#[utoipa::path(
    post,
    path = "/policies",
    request_body = SetPolicy,
    responses(
        (status = 200, description = "Policy saved", body = CompensationPolicy),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Staff member not found")
    ),
    tag = "Policies"
)]
pub async fn set_policy(
    pool: web::Data<SqlitePool>,
    payload: web::Json<SetPolicy>,
) -> Result<HttpResponse, ApiError> {
    validate(&payload)?;

    if !directory::staff_exists(pool.get_ref(), payload.staff_id).await? {
        return Err(ApiError::NotFound("staff member"));
    }

    let policy = CompensationPolicy {
        staff_id: payload.staff_id,
        commission_type: payload.commission_type,
        service_percent: payload.service_percent,
        product_percent: payload.product_percent,
        chair_rental_cents: payload.chair_rental_cents,
        fixed_monthly_cents: payload.fixed_monthly_cents,
        monthly_goal_cents: payload.monthly_goal_cents,
        goal_bonus_percent: payload.goal_bonus_percent,
        updated_at: Utc::now(),
    };

    // Replaces any prior policy; there is no policy history.
    sqlx::query(
        "INSERT INTO commission_policies \
             (staff_id, commission_type, service_percent, product_percent, \
              chair_rental_cents, fixed_monthly_cents, monthly_goal_cents, \
              goal_bonus_percent, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(staff_id) DO UPDATE SET \
             commission_type = excluded.commission_type, \
             service_percent = excluded.service_percent, \
             product_percent = excluded.product_percent, \
             chair_rental_cents = excluded.chair_rental_cents, \
             fixed_monthly_cents = excluded.fixed_monthly_cents, \
             monthly_goal_cents = excluded.monthly_goal_cents, \
             goal_bonus_percent = excluded.goal_bonus_percent, \
             updated_at = excluded.updated_at",
    )
    .bind(policy.staff_id)
    .bind(policy.commission_type)
    .bind(policy.service_percent)
    .bind(policy.product_percent)
    .bind(policy.chair_rental_cents)
    .bind(policy.fixed_monthly_cents)
    .bind(policy.monthly_goal_cents)
    .bind(policy.goal_bonus_percent)
    .bind(policy.updated_at)
    .execute(pool.get_ref())
    .await?;

    info!(staff_id = policy.staff_id, commission_type = %policy.commission_type, "policy saved");

    Ok(HttpResponse::Ok().json(policy))
}

/// Fetch the current policy for a staff member.
#[utoipa::path(
    get,
    path = "/policies/{staff_id}",
    params(("staff_id", description = "Staff member ID")),
    responses(
        (status = 200, body = CompensationPolicy),
        (status = 404, description = "No policy configured")
    ),
    tag = "Policies"
)]
pub async fn get_policy(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let staff_id = path.into_inner();

    let policy = sqlx::query_as::<_, CompensationPolicy>(
        "SELECT staff_id, commission_type, service_percent, product_percent, \
                chair_rental_cents, fixed_monthly_cents, monthly_goal_cents, \
                goal_bonus_percent, updated_at \
         FROM commission_policies WHERE staff_id = ?",
    )
    .bind(staff_id)
    .fetch_optional(pool.get_ref())
    .await?;

    match policy {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Err(ApiError::NotFound("compensation policy")),
    }
}

/// List all current policies.
#[utoipa::path(
    get,
    path = "/policies",
    responses((status = 200, body = [CompensationPolicy])),
    tag = "Policies"
)]
pub async fn list_policies(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let policies = sqlx::query_as::<_, CompensationPolicy>(
        "SELECT staff_id, commission_type, service_percent, product_percent, \
                chair_rental_cents, fixed_monthly_cents, monthly_goal_cents, \
                goal_bonus_percent, updated_at \
         FROM commission_policies ORDER BY staff_id",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(policies))
}
