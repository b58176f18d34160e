//! Move Orchestrator
//!
//! The only write entry points that touch schedule ordering. Each request
//! runs one placement attempt inside its own transaction; on a conflict
//! (midpoint exhausted, key range exceeded, or a lost race on the unique
//! key index) the target bucket is reflowed and the attempt retried exactly
//! once. There is no retry loop: a second consecutive failure is an
//! invariant violation and surfaces as [`PlacementError::RetryExhausted`].
//!
//! 状态机: ATTEMPT → {SUCCESS, CONFLICT}; CONFLICT → REFLOW → RETRY →
//! {SUCCESS, FATAL}.

use serde::Serialize;
use shared::models::{Schedule, ScheduleCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::PlacementError;
use super::bucket::Bucket;
use super::place::{self, Placement};
use super::reflow;

/// Result of a move request
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MoveOutcome {
    pub moved_from: Bucket,
    pub moved_to: Bucket,
    /// `false` when the schedule was already exactly where the request
    /// would place it (same bucket, same rank) and nothing was written
    pub position_changed: bool,
}

/// Create a schedule so it becomes the `position`-th member of `bucket`.
pub async fn create_with_placement(
    pool: &SqlitePool,
    bucket: &Bucket,
    position: u32,
    data: &ScheduleCreate,
) -> Result<Schedule, PlacementError> {
    match attempt_create(pool, bucket, position, data).await {
        Err(err) if err.is_conflict() => {
            tracing::warn!(bucket = %bucket, %err, "placement conflict on create, reflowing");
            reflow_in_own_tx(pool, bucket).await?;
            attempt_create(pool, bucket, position, data)
                .await
                .map_err(fatal_if_conflict)
        }
        outcome => outcome,
    }
}

/// Move a schedule so it becomes the `position`-th member of `target`.
///
/// On conflict only the target bucket is reflowed — the conflict can only
/// arise from the destination's existing keys.
pub async fn move_with_placement(
    pool: &SqlitePool,
    schedule_id: i64,
    target: &Bucket,
    position: u32,
) -> Result<MoveOutcome, PlacementError> {
    match attempt_move(pool, schedule_id, target, position).await {
        Err(err) if err.is_conflict() => {
            tracing::warn!(
                schedule_id,
                target = %target,
                %err,
                "placement conflict on move, reflowing target"
            );
            reflow_in_own_tx(pool, target).await?;
            attempt_move(pool, schedule_id, target, position)
                .await
                .map_err(fatal_if_conflict)
        }
        outcome => outcome,
    }
}

async fn attempt_create(
    pool: &SqlitePool,
    bucket: &Bucket,
    position: u32,
    data: &ScheduleCreate,
) -> Result<Schedule, PlacementError> {
    let mut tx = pool.begin().await?;
    let trip_id = bucket.resolve(&mut tx).await?;
    let order_key = place::place_new(&mut tx, bucket, position).await?;

    let now = now_millis();
    let schedule = Schedule {
        id: snowflake_id(),
        trip_id,
        day_id: bucket.day_id(),
        order_key,
        title: data.title.clone(),
        place: data.place.clone(),
        content: data.content.clone(),
        start_at: data.start_at,
        end_at: data.end_at,
        created_at: now,
        updated_at: now,
    };
    sqlx::query(
        "INSERT INTO schedule (id, trip_id, day_id, order_key, title, place, content,
                               start_at, end_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(schedule.id)
    .bind(schedule.trip_id)
    .bind(schedule.day_id)
    .bind(schedule.order_key)
    .bind(&schedule.title)
    .bind(&schedule.place)
    .bind(&schedule.content)
    .bind(schedule.start_at)
    .bind(schedule.end_at)
    .bind(schedule.created_at)
    .bind(schedule.updated_at)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(schedule)
}

async fn attempt_move(
    pool: &SqlitePool,
    schedule_id: i64,
    target: &Bucket,
    position: u32,
) -> Result<MoveOutcome, PlacementError> {
    let mut tx = pool.begin().await?;
    let schedule = sqlx::query_as::<_, Schedule>(
        "SELECT id, trip_id, day_id, order_key, title, place, content,
                start_at, end_at, created_at, updated_at
         FROM schedule WHERE id = ?1",
    )
    .bind(schedule_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(PlacementError::ScheduleNotFound(schedule_id))?;

    let trip_id = target.resolve(&mut tx).await?;
    let moved_from = Bucket::of(&schedule);

    match place::place_move(&mut tx, &schedule, target, position).await? {
        // Dropping the transaction rolls back: zero writes on a no-op
        Placement::Unchanged => Ok(MoveOutcome {
            moved_from,
            moved_to: moved_from,
            position_changed: false,
        }),
        Placement::At(order_key) => {
            sqlx::query(
                "UPDATE schedule SET trip_id = ?1, day_id = ?2, order_key = ?3, updated_at = ?4
                 WHERE id = ?5",
            )
            .bind(trip_id)
            .bind(target.day_id())
            .bind(order_key)
            .bind(now_millis())
            .bind(schedule.id)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok(MoveOutcome {
                moved_from,
                moved_to: *target,
                position_changed: true,
            })
        }
    }
}

/// Reflow between the failed attempt and the retry, in its own transaction.
async fn reflow_in_own_tx(pool: &SqlitePool, bucket: &Bucket) -> Result<u64, PlacementError> {
    let mut tx = pool.begin().await?;
    let rows = reflow::reflow_bucket(&mut tx, bucket).await?;
    tx.commit().await?;
    tracing::info!(bucket = %bucket, rows, "bucket reflowed after placement conflict");
    Ok(rows)
}

fn fatal_if_conflict(err: PlacementError) -> PlacementError {
    match err {
        // Reflow cannot create room the key range simply does not have: the
        // bucket holds more members than the range supports at GAP spacing.
        // Surfaced to the caller as a capacity limit, not retried further.
        PlacementError::RangeExceeded => {
            tracing::error!("order key range exceeded again right after a reflow");
            PlacementError::RangeExceeded
        }
        // A midpoint conflict right after a reflow contradicts the GAP
        // spacing guarantee.
        PlacementError::MidpointConflict => {
            tracing::error!("midpoint conflict right after a reflow");
            PlacementError::RetryExhausted
        }
        other => other,
    }
}
