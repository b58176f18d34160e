//! Placement Computation
//!
//! Decides the order key for a create or move request from the target
//! position's neighbors. Pure decision logic — persistence and the conflict
//! retry live in [`super::service`].

use shared::models::Schedule;
use sqlx::SqliteConnection;

use super::bucket::Bucket;
use super::order_key::{OrderKey, midpoint};
use super::PlacementError;

/// Outcome of a move computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Persist the schedule with this key
    At(OrderKey),
    /// The schedule already sits exactly where the request would place it;
    /// nothing to write
    Unchanged,
}

/// Key for inserting a new schedule so it becomes the `position`-th member
/// of `bucket`.
pub async fn place_new(
    conn: &mut SqliteConnection,
    bucket: &Bucket,
    position: u32,
) -> Result<OrderKey, PlacementError> {
    let (lower, upper) = bucket.neighbors_at(conn, position).await?;
    midpoint(lower.map(|e| e.order_key), upper.map(|e| e.order_key))
}

/// Key for moving an existing schedule to `position` in `target`.
///
/// Within the schedule's current bucket the neighbor window is computed as
/// if the schedule were lifted out; when its current key already falls
/// inside that window the move is reported as [`Placement::Unchanged`] and
/// no write happens. A move into a different bucket is always real.
pub async fn place_move(
    conn: &mut SqliteConnection,
    schedule: &Schedule,
    target: &Bucket,
    position: u32,
) -> Result<Placement, PlacementError> {
    if !target.contains(schedule) {
        let (lower, upper) = target.neighbors_at(conn, position).await?;
        let key = midpoint(lower.map(|e| e.order_key), upper.map(|e| e.order_key))?;
        return Ok(Placement::At(key));
    }

    let (lower, upper) = target
        .neighbors_at_excluding(conn, position, Some(schedule.id))
        .await?;
    let lower = lower.map(|e| e.order_key);
    let upper = upper.map(|e| e.order_key);

    let already_there = lower.is_none_or(|lo| lo < schedule.order_key)
        && upper.is_none_or(|up| schedule.order_key < up);
    if already_there {
        return Ok(Placement::Unchanged);
    }
    Ok(Placement::At(midpoint(lower, upper)?))
}
