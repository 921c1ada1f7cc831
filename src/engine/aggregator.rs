//! Sales aggregation over the completed-sales feed.
//!
//! Each completed sale belongs to exactly one staff member and one period
//! bucket, keyed by its completion date. Period bounds are inclusive
//! calendar dates. In-progress work never reaches `completed_sales`, so
//! nothing here has to filter it out.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::ApiError;
use crate::model::sale::{SaleKind, SalesSummary};

#[derive(sqlx::FromRow)]
struct SalesAggRow {
    staff_id: i64,
    kind: SaleKind,
    revenue_cents: i64,
    sales_count: i64,
}

/// Summarizes completed sales per staff member for `[start, end]`.
///
/// Staff members with no completed sales in the period are simply absent
/// from the map; callers treat that as zero revenue.
pub async fn summarize(
    pool: &SqlitePool,
    staff_id: Option<i64>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HashMap<i64, SalesSummary>, ApiError> {
    let mut sql = String::from(
        "SELECT staff_id, kind, \
                SUM(amount_cents) AS revenue_cents, \
                COUNT(*) AS sales_count \
         FROM completed_sales \
         WHERE completed_at >= ? AND completed_at <= ?",
    );
    if staff_id.is_some() {
        sql.push_str(" AND staff_id = ?");
    }
    sql.push_str(" GROUP BY staff_id, kind");

    let mut query = sqlx::query_as::<_, SalesAggRow>(&sql).bind(start).bind(end);
    if let Some(id) = staff_id {
        query = query.bind(id);
    }

    let rows = query.fetch_all(pool).await?;
    debug!(%start, %end, groups = rows.len(), "aggregated completed sales");

    let mut summaries: HashMap<i64, SalesSummary> = HashMap::new();
    for row in rows {
        let entry = summaries.entry(row.staff_id).or_default();
        match row.kind {
            SaleKind::Service => entry.service_revenue_cents += row.revenue_cents,
            SaleKind::Product => entry.product_revenue_cents += row.revenue_cents,
        }
        entry.sales_count += row.sales_count;
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn seed_sale(
        pool: &SqlitePool,
        id: &str,
        staff_id: i64,
        kind: &str,
        cents: i64,
        date: &str,
    ) {
        sqlx::query(
            "INSERT INTO completed_sales (id, staff_id, kind, amount_cents, completed_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(staff_id)
        .bind(kind)
        .bind(cents)
        .bind(date)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn seed_staff(pool: &SqlitePool, id: i64) {
        sqlx::query("INSERT INTO staff (id, name, active) VALUES (?, ?, 1)")
            .bind(id)
            .bind(format!("staff-{id}"))
            .execute(pool)
            .await
            .unwrap();
    }

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[actix_web::test]
    async fn splits_revenue_by_kind_and_staff() {
        let pool = test_pool().await;
        seed_staff(&pool, 1).await;
        seed_staff(&pool, 2).await;
        seed_sale(&pool, "s1", 1, "service", 100_000, "2026-08-10").await;
        seed_sale(&pool, "s2", 1, "product", 20_000, "2026-08-11").await;
        seed_sale(&pool, "s3", 2, "service", 5_000, "2026-08-12").await;

        let map = summarize(&pool, None, d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap();

        let one = map[&1];
        assert_eq!(one.service_revenue_cents, 100_000);
        assert_eq!(one.product_revenue_cents, 20_000);
        assert_eq!(one.sales_count, 2);
        assert_eq!(map[&2].service_revenue_cents, 5_000);
    }

    #[actix_web::test]
    async fn period_bounds_are_inclusive() {
        let pool = test_pool().await;
        seed_staff(&pool, 1).await;
        seed_sale(&pool, "s1", 1, "service", 100, "2026-08-01").await;
        seed_sale(&pool, "s2", 1, "service", 200, "2026-08-31").await;
        seed_sale(&pool, "s3", 1, "service", 400, "2026-07-31").await;
        seed_sale(&pool, "s4", 1, "service", 800, "2026-09-01").await;

        let map = summarize(&pool, None, d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap();

        assert_eq!(map[&1].service_revenue_cents, 300);
    }

    #[actix_web::test]
    async fn staff_filter_restricts_the_result() {
        let pool = test_pool().await;
        seed_staff(&pool, 1).await;
        seed_staff(&pool, 2).await;
        seed_sale(&pool, "s1", 1, "service", 100, "2026-08-10").await;
        seed_sale(&pool, "s2", 2, "service", 200, "2026-08-10").await;

        let map = summarize(&pool, Some(2), d("2026-08-01"), d("2026-08-31"))
            .await
            .unwrap();

        assert!(!map.contains_key(&1));
        assert_eq!(map[&2].service_revenue_cents, 200);
    }
}
