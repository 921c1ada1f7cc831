//! Payout calculation engine and payout state machine.
//!
//! `calculate` is a batch operation: it fans out one task per targeted staff
//! member (each reads disjoint data and writes a disjoint row) and reports
//! per-staff success or failure instead of failing the whole batch. The only
//! shared-resource hazard is a calculation racing `mark_paid` on the same
//! (staff, period) key; both sides go through a single atomic
//! read-modify-write so a frozen row is never silently overwritten.

pub mod aggregator;
pub mod calculator;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::adjustment::AdjustmentEntry;
use crate::model::payout::PayoutCalculation;
use crate::model::policy::CompensationPolicy;
use crate::model::sale::SalesSummary;
use crate::{directory, money::Money};

const PAYOUT_COLUMNS: &str = "id, staff_id, period_start, period_end, total_sales_cents, \
     service_commission_cents, product_commission_cents, rental_deduction_cents, \
     goal_bonus_cents, ledger_adjustment_cents, net_payable_cents, paid, paid_date, \
     calculated_at";

/// Result entry for one staff member within a calculation batch.
#[derive(Debug)]
pub struct StaffOutcome {
    pub staff_id: i64,
    pub result: Result<PayoutCalculation, ApiError>,
}

/// Runs the payout calculation for one staff member or all active staff.
///
/// Fails fast on an invalid period or an unknown staff filter; per-staff
/// failures (`PolicyMissing`, `AlreadyPaid`, conflicts) are attached to that
/// staff member's outcome and do not abort the rest of the batch.
pub async fn calculate(
    pool: &SqlitePool,
    staff_id: Option<i64>,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Result<Vec<StaffOutcome>, ApiError> {
    if period_start > period_end {
        return Err(ApiError::InvalidPeriod {
            start: period_start,
            end: period_end,
        });
    }

    let targets = match staff_id {
        Some(id) => {
            if !directory::staff_exists(pool, id).await? {
                return Err(ApiError::NotFound("staff member"));
            }
            vec![id]
        }
        None => directory::active_staff_ids(pool).await?,
    };

    let summaries = aggregator::summarize(pool, staff_id, period_start, period_end).await?;

    info!(
        %period_start,
        %period_end,
        staff = targets.len(),
        "calculating payouts"
    );

    let outcomes = join_all(targets.into_iter().map(|sid| {
        let pool = pool.clone();
        let summary = summaries.get(&sid).copied().unwrap_or_default();
        async move {
            StaffOutcome {
                staff_id: sid,
                result: calculate_one(&pool, sid, summary, period_start, period_end).await,
            }
        }
    }))
    .await;

    Ok(outcomes)
}

async fn calculate_one(
    pool: &SqlitePool,
    staff_id: i64,
    summary: SalesSummary,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Result<PayoutCalculation, ApiError> {
    let policy = fetch_policy(pool, staff_id)
        .await?
        .ok_or(ApiError::PolicyMissing(staff_id))?;

    let entries = ledger_entries(pool, staff_id, period_start, period_end).await?;

    let breakdown = calculator::commission_for(&policy, &summary);
    let ledger = calculator::ledger_total(&entries);
    let net = breakdown.net_payable(ledger);

    debug!(
        staff_id,
        net = net.cents(),
        ledger_entries = entries.len(),
        "computed payout"
    );

    let calculation = PayoutCalculation {
        id: String::new(), // assigned by persist
        staff_id,
        period_start,
        period_end,
        total_sales_cents: summary.total_sales().cents(),
        service_commission_cents: breakdown.service_commission.cents(),
        product_commission_cents: breakdown.product_commission.cents(),
        rental_deduction_cents: breakdown.rental_deduction.cents(),
        goal_bonus_cents: breakdown.goal_bonus.cents(),
        ledger_adjustment_cents: ledger.cents(),
        net_payable_cents: net.cents(),
        paid: false,
        paid_date: None,
        calculated_at: Utc::now(),
    };

    persist(pool, calculation).await
}

async fn fetch_policy(
    pool: &SqlitePool,
    staff_id: i64,
) -> Result<Option<CompensationPolicy>, ApiError> {
    let policy = sqlx::query_as::<_, CompensationPolicy>(
        "SELECT staff_id, commission_type, service_percent, product_percent, \
                chair_rental_cents, fixed_monthly_cents, monthly_goal_cents, \
                goal_bonus_percent, updated_at \
         FROM commission_policies WHERE staff_id = ?",
    )
    .bind(staff_id)
    .fetch_optional(pool)
    .await?;

    Ok(policy)
}

async fn ledger_entries(
    pool: &SqlitePool,
    staff_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<AdjustmentEntry>, ApiError> {
    let entries = sqlx::query_as::<_, AdjustmentEntry>(
        "SELECT id, staff_id, kind, description, amount_cents, effective_date, created_at \
         FROM adjustment_entries \
         WHERE staff_id = ? AND effective_date >= ? AND effective_date <= ?",
    )
    .bind(staff_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Upserts the calculation for its (staff, period) key in one transaction.
///
/// A key whose row is already paid is frozen: the recalculation fails with
/// `AlreadyPaid` and the stored row is left untouched. An unpaid row keeps
/// its id across recalculation; the UPDATE is guarded by `paid = 0` so a row
/// that flipped to paid concurrently is never overwritten.
async fn persist(
    pool: &SqlitePool,
    mut calculation: PayoutCalculation,
) -> Result<PayoutCalculation, ApiError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, (String, bool)>(
        "SELECT id, paid FROM payout_calculations \
         WHERE staff_id = ? AND period_start = ? AND period_end = ?",
    )
    .bind(calculation.staff_id)
    .bind(calculation.period_start)
    .bind(calculation.period_end)
    .fetch_optional(&mut *tx)
    .await?;

    match existing {
        Some((_, true)) => return Err(ApiError::AlreadyPaid),
        Some((id, false)) => {
            // Retroactive policy application is an explicit choice: an unpaid
            // period is always re-derived with the current policy.
            info!(
                staff_id = calculation.staff_id,
                period_start = %calculation.period_start,
                period_end = %calculation.period_end,
                "recalculating unpaid payout with the current policy"
            );
            let affected = sqlx::query(
                "UPDATE payout_calculations SET \
                     total_sales_cents = ?, service_commission_cents = ?, \
                     product_commission_cents = ?, rental_deduction_cents = ?, \
                     goal_bonus_cents = ?, ledger_adjustment_cents = ?, \
                     net_payable_cents = ?, calculated_at = ? \
                 WHERE id = ? AND paid = 0",
            )
            .bind(calculation.total_sales_cents)
            .bind(calculation.service_commission_cents)
            .bind(calculation.product_commission_cents)
            .bind(calculation.rental_deduction_cents)
            .bind(calculation.goal_bonus_cents)
            .bind(calculation.ledger_adjustment_cents)
            .bind(calculation.net_payable_cents)
            .bind(calculation.calculated_at)
            .bind(&id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if affected == 0 {
                return Err(ApiError::ConcurrencyConflict);
            }
            calculation.id = id;
        }
        None => {
            calculation.id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO payout_calculations \
                     (id, staff_id, period_start, period_end, total_sales_cents, \
                      service_commission_cents, product_commission_cents, \
                      rental_deduction_cents, goal_bonus_cents, ledger_adjustment_cents, \
                      net_payable_cents, paid, paid_date, calculated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, NULL, ?)",
            )
            .bind(&calculation.id)
            .bind(calculation.staff_id)
            .bind(calculation.period_start)
            .bind(calculation.period_end)
            .bind(calculation.total_sales_cents)
            .bind(calculation.service_commission_cents)
            .bind(calculation.product_commission_cents)
            .bind(calculation.rental_deduction_cents)
            .bind(calculation.goal_bonus_cents)
            .bind(calculation.ledger_adjustment_cents)
            .bind(calculation.net_payable_cents)
            .bind(calculation.calculated_at)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(calculation)
}

/// Fetches a stored payout calculation by id.
pub async fn get_payout(pool: &SqlitePool, id: &str) -> Result<PayoutCalculation, ApiError> {
    let payout = sqlx::query_as::<_, PayoutCalculation>(&format!(
        "SELECT {PAYOUT_COLUMNS} FROM payout_calculations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    payout.ok_or(ApiError::NotFound("payout calculation"))
}

/// Pending -> Paid, the only transition. There is no "unpay": correcting a
/// mistaken payment takes a compensating ledger entry in a later period.
pub async fn mark_paid(
    pool: &SqlitePool,
    id: &str,
    paid_date: NaiveDate,
) -> Result<PayoutCalculation, ApiError> {
    let payout = get_payout(pool, id).await?;

    if payout.paid {
        return Err(ApiError::AlreadyPaid);
    }
    if paid_date < payout.period_end {
        return Err(ApiError::Validation(format!(
            "paid date {} precedes period end {}",
            paid_date, payout.period_end
        )));
    }

    // Compare-and-set: a row that turned paid between the read above and
    // this update is reported as AlreadyPaid, never double-transitioned.
    let affected = sqlx::query(
        "UPDATE payout_calculations SET paid = 1, paid_date = ? WHERE id = ? AND paid = 0",
    )
    .bind(paid_date)
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(ApiError::AlreadyPaid);
    }

    info!(
        payout_id = %id,
        %paid_date,
        net = %Money::from_cents(payout.net_payable_cents),
        "payout marked paid"
    );

    get_payout(pool, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::model::policy::CommissionType;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn seed_staff(pool: &SqlitePool, id: i64) {
        sqlx::query("INSERT INTO staff (id, name, active) VALUES (?, ?, 1)")
            .bind(id)
            .bind(format!("staff-{id}"))
            .execute(pool)
            .await
            .unwrap();
    }

    async fn seed_policy(pool: &SqlitePool, staff_id: i64, t: CommissionType, fields: [i64; 6]) {
        let [service_pct, product_pct, rent, fixed, goal, bonus_pct] = fields;
        sqlx::query(
            "INSERT INTO commission_policies \
                 (staff_id, commission_type, service_percent, product_percent, \
                  chair_rental_cents, fixed_monthly_cents, monthly_goal_cents, \
                  goal_bonus_percent, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(staff_id)
        .bind(t)
        .bind(service_pct)
        .bind(product_pct)
        .bind(rent)
        .bind(fixed)
        .bind(goal)
        .bind(bonus_pct)
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
    }

    async fn seed_sale(pool: &SqlitePool, staff_id: i64, kind: &str, cents: i64, date: &str) {
        sqlx::query(
            "INSERT INTO completed_sales (id, staff_id, kind, amount_cents, completed_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(staff_id)
        .bind(kind)
        .bind(cents)
        .bind(date)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn seed_adjustment(pool: &SqlitePool, staff_id: i64, kind: &str, cents: i64, date: &str) {
        sqlx::query(
            "INSERT INTO adjustment_entries \
                 (id, staff_id, kind, description, amount_cents, effective_date, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(staff_id)
        .bind(kind)
        .bind("seeded")
        .bind(cents)
        .bind(date)
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
    }

    #[actix_web::test]
    async fn rejects_inverted_periods() {
        let pool = test_pool().await;
        let err = calculate(&pool, None, d("2026-08-31"), d("2026-08-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPeriod { .. }));
    }

    #[actix_web::test]
    async fn unknown_staff_filter_is_not_found() {
        let pool = test_pool().await;
        let err = calculate(&pool, Some(99), d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn percentage_end_to_end_with_advance() {
        let pool = test_pool().await;
        seed_staff(&pool, 1).await;
        seed_policy(&pool, 1, CommissionType::Percentage, [50, 30, 0, 0, 0, 0]).await;
        seed_sale(&pool, 1, "service", 100_000, "2026-08-10").await;
        seed_sale(&pool, 1, "product", 20_000, "2026-08-11").await;
        seed_adjustment(&pool, 1, "advance", 10_000, "2026-08-15").await;

        let outcomes = calculate(&pool, Some(1), d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap();
        let payout = outcomes[0].result.as_ref().unwrap();

        assert_eq!(payout.service_commission_cents, 50_000);
        assert_eq!(payout.product_commission_cents, 6_000);
        assert_eq!(payout.ledger_adjustment_cents, -10_000);
        assert_eq!(payout.net_payable_cents, 46_000);
        assert!(!payout.paid);
    }

    #[actix_web::test]
    async fn missing_policy_fails_only_that_staff_member() {
        let pool = test_pool().await;
        seed_staff(&pool, 1).await;
        seed_staff(&pool, 2).await;
        seed_policy(&pool, 1, CommissionType::Percentage, [50, 30, 0, 0, 0, 0]).await;
        seed_sale(&pool, 1, "service", 10_000, "2026-08-10").await;
        seed_sale(&pool, 2, "service", 10_000, "2026-08-10").await;

        let outcomes = calculate(&pool, None, d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 2);

        let ok = outcomes.iter().find(|o| o.staff_id == 1).unwrap();
        assert!(ok.result.is_ok());

        let failed = outcomes.iter().find(|o| o.staff_id == 2).unwrap();
        assert!(matches!(
            failed.result.as_ref().unwrap_err(),
            ApiError::PolicyMissing(2)
        ));
    }

    #[actix_web::test]
    async fn recalculation_is_idempotent_and_keeps_the_row_id() {
        let pool = test_pool().await;
        seed_staff(&pool, 1).await;
        seed_policy(&pool, 1, CommissionType::Percentage, [50, 30, 0, 0, 0, 0]).await;
        seed_sale(&pool, 1, "service", 100_000, "2026-08-10").await;

        let first = calculate(&pool, Some(1), d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap()
            .remove(0)
            .result
            .unwrap();
        let second = calculate(&pool, Some(1), d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap()
            .remove(0)
            .result
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.net_payable_cents, second.net_payable_cents);
        assert_eq!(first.service_commission_cents, second.service_commission_cents);
        assert_eq!(first.ledger_adjustment_cents, second.ledger_adjustment_cents);
    }

    #[actix_web::test]
    async fn paid_period_is_frozen() {
        let pool = test_pool().await;
        seed_staff(&pool, 1).await;
        seed_policy(&pool, 1, CommissionType::Percentage, [50, 30, 0, 0, 0, 0]).await;
        seed_sale(&pool, 1, "service", 100_000, "2026-08-10").await;

        let payout = calculate(&pool, Some(1), d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap()
            .remove(0)
            .result
            .unwrap();

        mark_paid(&pool, &payout.id, d("2026-08-31")).await.unwrap();

        // A new sale lands, but the paid period must not be recomputed.
        seed_sale(&pool, 1, "service", 999_999, "2026-08-20").await;
        let outcome = calculate(&pool, Some(1), d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap()
            .remove(0);
        assert!(matches!(
            outcome.result.unwrap_err(),
            ApiError::AlreadyPaid
        ));

        let stored = get_payout(&pool, &payout.id).await.unwrap();
        assert_eq!(stored.net_payable_cents, payout.net_payable_cents);
        assert!(stored.paid);
        assert_eq!(stored.paid_date, Some(d("2026-08-31")));
    }

    #[actix_web::test]
    async fn chair_rental_negative_net_survives_persistence() {
        let pool = test_pool().await;
        seed_staff(&pool, 1).await;
        seed_policy(&pool, 1, CommissionType::ChairRental, [0, 30, 30_000, 0, 0, 0]).await;
        seed_sale(&pool, 1, "service", 25_000, "2026-08-10").await;
        seed_sale(&pool, 1, "product", 10_000, "2026-08-10").await;

        let payout = calculate(&pool, Some(1), d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap()
            .remove(0)
            .result
            .unwrap();

        assert_eq!(payout.service_commission_cents, -5_000);
        assert_eq!(payout.rental_deduction_cents, 30_000);
        assert_eq!(payout.net_payable_cents, -2_000);

        let stored = get_payout(&pool, &payout.id).await.unwrap();
        assert_eq!(stored.net_payable_cents, -2_000);
    }

    #[actix_web::test]
    async fn mark_paid_transitions_and_validates() {
        let pool = test_pool().await;
        seed_staff(&pool, 1).await;
        seed_policy(&pool, 1, CommissionType::Percentage, [50, 0, 0, 0, 0, 0]).await;
        seed_sale(&pool, 1, "service", 10_000, "2026-08-10").await;

        let payout = calculate(&pool, Some(1), d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap()
            .remove(0)
            .result
            .unwrap();

        let err = mark_paid(&pool, "no-such-id", d("2026-09-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = mark_paid(&pool, &payout.id, d("2026-08-30"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let paid = mark_paid(&pool, &payout.id, d("2026-09-01")).await.unwrap();
        assert!(paid.paid);
        assert_eq!(paid.paid_date, Some(d("2026-09-01")));

        let err = mark_paid(&pool, &payout.id, d("2026-09-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AlreadyPaid));
    }

    #[actix_web::test]
    async fn fixed_monthly_goal_bonus_end_to_end() {
        let pool = test_pool().await;
        seed_staff(&pool, 1).await;
        // Flat 1500.00 + 10% of products, goal 500.00 with 5% bonus.
        seed_policy(
            &pool,
            1,
            CommissionType::FixedMonthly,
            [0, 10, 0, 150_000, 50_000, 5],
        )
        .await;
        seed_sale(&pool, 1, "service", 40_000, "2026-08-05").await;
        seed_sale(&pool, 1, "product", 10_000, "2026-08-06").await;

        let payout = calculate(&pool, Some(1), d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap()
            .remove(0)
            .result
            .unwrap();

        assert_eq!(payout.total_sales_cents, 50_000);
        assert_eq!(payout.service_commission_cents, 150_000);
        assert_eq!(payout.product_commission_cents, 1_000);
        // Total sales meet the goal exactly; boundary is inclusive.
        assert_eq!(payout.goal_bonus_cents, 2_500);
        assert_eq!(payout.net_payable_cents, 153_500);
    }
}
