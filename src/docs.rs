use crate::api::adjustment::{CreateAdjustment, LedgerQuery};
use crate::api::dashboard::{DashboardResponse, TopPerformer};
use crate::api::payout::{
    CalculateRequest, CalculateResponse, MarkPaidRequest, ReportQuery, ReportResponse,
    ReportSummary, StaffError, StaffResult,
};
use crate::api::policy::SetPolicy;
use crate::model::adjustment::{AdjustmentEntry, AdjustmentKind};
use crate::model::payout::PayoutCalculation;
use crate::model::policy::{CommissionType, CompensationPolicy};
use crate::period::ReportPreset;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Commission Engine API",
        version = "1.0.0",
        description = r#"
## Commission & Payout Engine

Batch commission calculation and payout tracking for service staff.

### Key Features
- **Compensation Policies**
  - One active policy per staff member: percentage, fixed monthly, or chair rental
- **Adjustment Ledger**
  - Append-only discounts, advances, bonuses and penalties
- **Payout Calculation**
  - Per-period batch calculation with per-staff success/failure reporting
- **Payout Tracking**
  - One-way pending to paid transition; paid periods are frozen
- **Reporting**
  - Monthly dashboard, top performers, and day/week/month reports

### Money
All amounts are integer minor units (cents). Decimal notation appears only
in display fields.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::policy::set_policy,
        crate::api::policy::get_policy,
        crate::api::policy::list_policies,

        crate::api::adjustment::create_adjustment,
        crate::api::adjustment::list_adjustments,

        crate::api::payout::calculate,
        crate::api::payout::mark_paid,
        crate::api::payout::get_payout,
        crate::api::payout::report,

        crate::api::dashboard::dashboard
    ),
    components(
        schemas(
            CommissionType,
            CompensationPolicy,
            SetPolicy,
            AdjustmentKind,
            AdjustmentEntry,
            CreateAdjustment,
            LedgerQuery,
            PayoutCalculation,
            CalculateRequest,
            CalculateResponse,
            StaffResult,
            StaffError,
            MarkPaidRequest,
            ReportPreset,
            ReportQuery,
            ReportSummary,
            ReportResponse,
            DashboardResponse,
            TopPerformer
        )
    ),
    tags(
        (name = "Policies", description = "Compensation policy management"),
        (name = "Adjustments", description = "Append-only adjustment ledger"),
        (name = "Payouts", description = "Payout calculation and state tracking"),
        (name = "Dashboard", description = "Read-only reporting"),
    )
)]
pub struct ApiDoc;

/// Document with the runtime API prefix injected as the server URL, so the
/// swagger "try it out" targets wherever the routes are actually mounted.
pub fn openapi_for(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![utoipa::openapi::Server::new(api_prefix)]);
    doc
}
