//! Trip Repository
//!
//! Trip rows plus the day rows derived from the trip period. Shrinking a
//! period drains the removed days into temporary storage before deleting
//! them, oldest date first.

use chrono::NaiveDate;
use shared::models::{Trip, TripCreate, TripPeriodUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult};
use crate::placement::bucket::Bucket;
use crate::placement::reflow;

/// Longest allowed trip period, in days
const MAX_PERIOD_DAYS: usize = 365;

const COLUMNS: &str = "id, owner_id, title, start_date, end_date, created_at, updated_at";

/// Create a trip; one day row per date of the period (if any)
pub async fn create(pool: &SqlitePool, data: TripCreate) -> RepoResult<Trip> {
    let dates = period_dates(data.start_date, data.end_date)?;
    let now = now_millis();
    let trip = Trip {
        id: snowflake_id(),
        owner_id: data.owner_id,
        title: data.title,
        start_date: data.start_date,
        end_date: data.end_date,
        created_at: now,
        updated_at: now,
    };

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO trip (id, owner_id, title, start_date, end_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(trip.id)
    .bind(trip.owner_id)
    .bind(&trip.title)
    .bind(trip.start_date)
    .bind(trip.end_date)
    .bind(trip.created_at)
    .bind(trip.updated_at)
    .execute(&mut *tx)
    .await?;
    for date in dates {
        insert_day(&mut tx, trip.id, date).await?;
    }
    tx.commit().await?;
    Ok(trip)
}

/// Find trip by id
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Trip>> {
    let sql = format!("SELECT {COLUMNS} FROM trip WHERE id = ?1");
    let trip = sqlx::query_as::<_, Trip>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(trip)
}

/// All trips of an owner, newest first
pub async fn find_by_owner(pool: &SqlitePool, owner_id: i64) -> RepoResult<Vec<Trip>> {
    let sql = format!("SELECT {COLUMNS} FROM trip WHERE owner_id = ?1 ORDER BY created_at DESC");
    let trips = sqlx::query_as::<_, Trip>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    Ok(trips)
}

/// Replace the trip's period.
///
/// Dates entering the period gain a day row. Days falling out of it are
/// drained into the trip's temporary storage (ascending date order, so
/// merged contents keep their calendar order) and then deleted.
pub async fn set_period(
    pool: &SqlitePool,
    trip_id: i64,
    data: TripPeriodUpdate,
) -> RepoResult<Trip> {
    let new_dates = period_dates(data.start_date, data.end_date)?;

    let mut tx = pool.begin().await?;
    let mut trip = {
        let sql = format!("SELECT {COLUMNS} FROM trip WHERE id = ?1");
        sqlx::query_as::<_, Trip>(&sql)
            .bind(trip_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Trip {trip_id} not found")))?
    };

    let existing: Vec<(i64, NaiveDate)> =
        sqlx::query_as("SELECT id, date FROM day WHERE trip_id = ?1 ORDER BY date")
            .bind(trip_id)
            .fetch_all(&mut *tx)
            .await?;

    // Drain and delete days leaving the period, oldest first
    let storage = Bucket::Storage { trip_id };
    for (day_id, date) in &existing {
        if !new_dates.contains(date) {
            reflow::drain_to_tail(&mut tx, &Bucket::Day { day_id: *day_id }, &storage).await?;
            sqlx::query("DELETE FROM day WHERE id = ?1")
                .bind(day_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    // Add days for dates entering the period
    for date in &new_dates {
        if !existing.iter().any(|(_, d)| d == date) {
            insert_day(&mut tx, trip_id, *date).await?;
        }
    }

    let now = now_millis();
    sqlx::query("UPDATE trip SET start_date = ?1, end_date = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(now)
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    trip.start_date = data.start_date;
    trip.end_date = data.end_date;
    trip.updated_at = now;
    Ok(trip)
}

/// Hard delete a trip with all its days and schedules
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM trip WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Ok(false);
    }

    // Schedules reference day rows: remove them first
    sqlx::query("DELETE FROM schedule WHERE trip_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM day WHERE trip_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM trip WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(true)
}

async fn insert_day(conn: &mut SqliteConnection, trip_id: i64, date: NaiveDate) -> RepoResult<i64> {
    let id = snowflake_id();
    sqlx::query("INSERT INTO day (id, trip_id, date) VALUES (?1, ?2, ?3)")
        .bind(id)
        .bind(trip_id)
        .bind(date)
        .execute(conn)
        .await?;
    Ok(id)
}

/// Expand an optional period into its dates. Both bounds or neither.
fn period_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> RepoResult<Vec<NaiveDate>> {
    match (start, end) {
        (None, None) => Ok(Vec::new()),
        (Some(start), Some(end)) => {
            if end < start {
                return Err(RepoError::Validation(
                    "Trip period end precedes start".to_string(),
                ));
            }
            let dates: Vec<NaiveDate> = start
                .iter_days()
                .take(MAX_PERIOD_DAYS + 1)
                .take_while(|d| *d <= end)
                .collect();
            if dates.len() > MAX_PERIOD_DAYS || dates.last() != Some(&end) {
                return Err(RepoError::Validation(format!(
                    "Trip period exceeds {MAX_PERIOD_DAYS} days"
                )));
            }
            Ok(dates)
        }
        _ => Err(RepoError::Validation(
            "Trip period requires both start and end dates".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::ORDER_GAP;
    use crate::placement::testing::{DAY1, DAY2, TRIP, insert_schedule, listing, test_pool};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn day_dates(pool: &SqlitePool, trip_id: i64) -> Vec<NaiveDate> {
        sqlx::query_scalar("SELECT date FROM day WHERE trip_id = ?1 ORDER BY date")
            .bind(trip_id)
            .fetch_all(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_with_period_creates_days() {
        let pool = test_pool().await;
        let trip = create(
            &pool,
            TripCreate {
                owner_id: 7,
                title: "Kyoto".to_string(),
                start_date: Some(date("2025-04-01")),
                end_date: Some(date("2025-04-03")),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            day_dates(&pool, trip.id).await,
            vec![date("2025-04-01"), date("2025-04-02"), date("2025-04-03")]
        );
    }

    #[tokio::test]
    async fn create_without_period_creates_no_days() {
        let pool = test_pool().await;
        let trip = create(
            &pool,
            TripCreate {
                owner_id: 7,
                title: "Someday".to_string(),
                start_date: None,
                end_date: None,
            },
        )
        .await
        .unwrap();
        assert!(day_dates(&pool, trip.id).await.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_half_open_period() {
        let pool = test_pool().await;
        let err = create(
            &pool,
            TripCreate {
                owner_id: 7,
                title: "broken".to_string(),
                start_date: Some(date("2025-04-01")),
                end_date: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_inverted_period() {
        let pool = test_pool().await;
        let err = create(
            &pool,
            TripCreate {
                owner_id: 7,
                title: "broken".to_string(),
                start_date: Some(date("2025-04-03")),
                end_date: Some(date("2025-04-01")),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn extend_period_adds_missing_days_and_keeps_schedules() {
        let pool = test_pool().await;
        insert_schedule(&pool, 101, Some(DAY1), 10).await;

        set_period(
            &pool,
            TRIP,
            TripPeriodUpdate {
                start_date: Some(date("2025-03-01")),
                end_date: Some(date("2025-03-04")),
            },
        )
        .await
        .unwrap();

        assert_eq!(day_dates(&pool, TRIP).await.len(), 4);
        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(
            listing(&mut conn, &Bucket::Day { day_id: DAY1 }).await,
            vec![(101, 10)]
        );
    }

    #[tokio::test]
    async fn shrink_period_drains_removed_days_to_storage() {
        let pool = test_pool().await;
        insert_schedule(&pool, 201, Some(DAY2), 5).await;

        let trip = set_period(
            &pool,
            TRIP,
            TripPeriodUpdate {
                start_date: Some(date("2025-03-01")),
                end_date: Some(date("2025-03-01")),
            },
        )
        .await
        .unwrap();
        assert_eq!(trip.end_date, Some(date("2025-03-01")));

        // Day 2 is gone, its schedule now sits in temporary storage
        assert_eq!(day_dates(&pool, TRIP).await, vec![date("2025-03-01")]);
        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(
            listing(&mut conn, &Bucket::Storage { trip_id: TRIP }).await,
            vec![(201, ORDER_GAP)]
        );
    }

    #[tokio::test]
    async fn clearing_period_drains_all_days_in_date_order() {
        // Storage [w], day1 [x, y], day2 [z] — after the period is removed
        // storage must read [w, x, y, z] at canonical spacing.
        let pool = test_pool().await;
        insert_schedule(&pool, 1, Some(DAY1), 0).await; // x
        insert_schedule(&pool, 2, Some(DAY1), 10).await; // y
        insert_schedule(&pool, 3, Some(DAY2), 0).await; // z
        insert_schedule(&pool, 4, None, 0).await; // w

        set_period(
            &pool,
            TRIP,
            TripPeriodUpdate {
                start_date: None,
                end_date: None,
            },
        )
        .await
        .unwrap();

        assert!(day_dates(&pool, TRIP).await.is_empty());
        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(
            listing(&mut conn, &Bucket::Storage { trip_id: TRIP }).await,
            vec![
                (4, 0),
                (1, ORDER_GAP),
                (2, 2 * ORDER_GAP),
                (3, 3 * ORDER_GAP),
            ]
        );
    }

    #[tokio::test]
    async fn set_period_on_unknown_trip_is_not_found() {
        let pool = test_pool().await;
        let err = set_period(
            &pool,
            999,
            TripPeriodUpdate {
                start_date: None,
                end_date: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn period_longer_than_a_year_is_rejected() {
        let pool = test_pool().await;
        let err = set_period(
            &pool,
            TRIP,
            TripPeriodUpdate {
                start_date: Some(date("2025-01-01")),
                end_date: Some(date("2026-06-01")),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_removes_days_and_schedules() {
        let pool = test_pool().await;
        insert_schedule(&pool, 101, Some(DAY1), 10).await;
        insert_schedule(&pool, 201, None, 10).await;

        assert!(delete(&pool, TRIP).await.unwrap());
        assert!(find_by_id(&pool, TRIP).await.unwrap().is_none());
        assert!(day_dates(&pool, TRIP).await.is_empty());
        let schedules: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedule")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(schedules, 0);

        assert!(!delete(&pool, TRIP).await.unwrap());
    }
}
