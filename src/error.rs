//! Error taxonomy shared by the handlers and the calculation engine.
//!
//! Every variant maps to one HTTP status and a JSON `{code, message}` body.
//! Database details are logged, never returned to the caller.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::NaiveDate;
use derive_more::Display;
use serde_json::json;
use tracing::error;

#[derive(Debug, Display)]
pub enum ApiError {
    /// Malformed input, rejected before any mutation. Also covers the
    /// mark-paid `InvalidDate` rule (paid date before period end).
    #[display(fmt = "validation error: {}", _0)]
    Validation(String),

    #[display(fmt = "invalid period: start {} is after end {}", start, end)]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// Calculation cannot proceed for this staff member; other staff in the
    /// same batch still complete.
    #[display(fmt = "no compensation policy configured for staff member {}", _0)]
    PolicyMissing(i64),

    /// The payout row is frozen; recalculation and re-payment are rejected.
    #[display(fmt = "payout is already marked as paid")]
    AlreadyPaid,

    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),

    /// Per-key serialization detected a race. Safe to retry once.
    #[display(fmt = "concurrent update on the same payout, retry the request")]
    ConcurrencyConflict,

    #[display(fmt = "internal database error")]
    Database,
}

impl ApiError {
    /// Stable machine-readable code carried in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::InvalidPeriod { .. } => "invalid_period",
            ApiError::PolicyMissing(_) => "policy_missing",
            ApiError::AlreadyPaid => "already_paid",
            ApiError::NotFound(_) => "not_found",
            ApiError::ConcurrencyConflict => "concurrency_conflict",
            ApiError::Database => "database_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidPeriod { .. } => StatusCode::BAD_REQUEST,
            ApiError::PolicyMissing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::AlreadyPaid | ApiError::ConcurrencyConflict => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "code": self.code(),
            "message": self.to_string(),
        }))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            let msg = db.message();
            if msg.contains("locked") || msg.contains("busy") {
                return ApiError::ConcurrencyConflict;
            }
        }
        error!(error = %e, "database operation failed");
        ApiError::Database
    }
}
