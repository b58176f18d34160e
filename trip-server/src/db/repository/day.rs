//! Day Repository

use shared::models::Day;
use sqlx::SqlitePool;

use super::{RepoResult, schedule};
use crate::placement::bucket::Bucket;
use crate::placement::reflow;

/// Days of a trip in calendar order
pub async fn find_by_trip(pool: &SqlitePool, trip_id: i64) -> RepoResult<Vec<Day>> {
    let days = sqlx::query_as::<_, Day>(
        "SELECT id, trip_id, date FROM day WHERE trip_id = ?1 ORDER BY date",
    )
    .bind(trip_id)
    .fetch_all(pool)
    .await?;
    Ok(days)
}

/// Days of a trip with their schedules attached, both in listing order
pub async fn find_by_trip_with_schedules(pool: &SqlitePool, trip_id: i64) -> RepoResult<Vec<Day>> {
    let mut days = find_by_trip(pool, trip_id).await?;
    for day in &mut days {
        day.schedules = schedule::find_by_day(pool, day.id).await?;
    }
    Ok(days)
}

/// Find day by id
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Day>> {
    let day = sqlx::query_as::<_, Day>("SELECT id, trip_id, date FROM day WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(day)
}

/// Remove a day: its contents are relocated into the trip's temporary
/// storage first, then the row is deleted. Trip deletion and period-shrink
/// both go through this contract.
pub async fn delete_with_relocation(pool: &SqlitePool, day_id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    let trip_id: Option<i64> = sqlx::query_scalar("SELECT trip_id FROM day WHERE id = ?1")
        .bind(day_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(trip_id) = trip_id else {
        return Ok(false);
    };

    reflow::drain_to_tail(&mut tx, &Bucket::Day { day_id }, &Bucket::Storage { trip_id }).await?;
    sqlx::query("DELETE FROM day WHERE id = ?1")
        .bind(day_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(true)
}
