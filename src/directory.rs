//! Read-through access to the staff directory.
//!
//! The staff table is owned by the surrounding admin backend; this service
//! only validates writes against it and enumerates active staff for batch
//! calculations. Lookups always hit the store so policy and ledger writes
//! never trust a stale process-wide copy.

use sqlx::SqlitePool;

use crate::error::ApiError;

pub async fn staff_exists(pool: &SqlitePool, staff_id: i64) -> Result<bool, ApiError> {
    let found = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM staff WHERE id = ? AND active = 1",
    )
    .bind(staff_id)
    .fetch_one(pool)
    .await?;

    Ok(found > 0)
}

pub async fn active_staff_ids(pool: &SqlitePool) -> Result<Vec<i64>, ApiError> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM staff WHERE active = 1 ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(ids)
}

pub async fn active_staff_count(pool: &SqlitePool) -> Result<i64, ApiError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM staff WHERE active = 1")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
