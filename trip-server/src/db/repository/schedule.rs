//! Schedule Repository
//!
//! Descriptive reads and writes only. Creation and every ordering mutation
//! go through `crate::placement`; `order_key` is opaque here and used
//! solely for sorting.

use shared::models::{Schedule, ScheduleUpdate};
use shared::util::now_millis;
use sqlx::SqlitePool;

use super::{RepoError, RepoResult};

const COLUMNS: &str = "id, trip_id, day_id, order_key, title, place, content, \
                       start_at, end_at, created_at, updated_at";

/// Find schedule by id
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Schedule>> {
    let sql = format!("SELECT {COLUMNS} FROM schedule WHERE id = ?1");
    let schedule = sqlx::query_as::<_, Schedule>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(schedule)
}

/// Schedules of one day, ascending order key
pub async fn find_by_day(pool: &SqlitePool, day_id: i64) -> RepoResult<Vec<Schedule>> {
    let sql = format!("SELECT {COLUMNS} FROM schedule WHERE day_id = ?1 ORDER BY order_key, id");
    let schedules = sqlx::query_as::<_, Schedule>(&sql)
        .bind(day_id)
        .fetch_all(pool)
        .await?;
    Ok(schedules)
}

/// Temporary-storage schedules of a trip, ascending order key
pub async fn find_storage(pool: &SqlitePool, trip_id: i64) -> RepoResult<Vec<Schedule>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM schedule
         WHERE trip_id = ?1 AND day_id IS NULL ORDER BY order_key, id"
    );
    let schedules = sqlx::query_as::<_, Schedule>(&sql)
        .bind(trip_id)
        .fetch_all(pool)
        .await?;
    Ok(schedules)
}

/// Update descriptive fields; unset fields stay as they are
pub async fn update(pool: &SqlitePool, id: i64, data: ScheduleUpdate) -> RepoResult<Schedule> {
    let rows = sqlx::query(
        "UPDATE schedule SET
             title = COALESCE(?1, title),
             place = COALESCE(?2, place),
             content = COALESCE(?3, content),
             start_at = COALESCE(?4, start_at),
             end_at = COALESCE(?5, end_at),
             updated_at = ?6
         WHERE id = ?7",
    )
    .bind(&data.title)
    .bind(&data.place)
    .bind(&data.content)
    .bind(data.start_at)
    .bind(data.end_at)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(RepoError::NotFound(format!("Schedule {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to reload updated schedule".to_string()))
}

/// Hard delete a schedule
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM schedule WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}
