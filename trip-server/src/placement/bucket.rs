//! Bucket Abstraction
//!
//! A bucket is the ordered set of schedules sharing one parent: a specific
//! day, or a trip's temporary storage (schedules with no day yet). Buckets
//! identify rows by a WHERE filter; they never own data themselves.

use serde::{Deserialize, Serialize};
use shared::models::Schedule;
use sqlx::SqliteConnection;

use super::PlacementError;

/// Identifies one ordered sequence of schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Bucket {
    /// Schedules assigned to one day
    Day { day_id: i64 },
    /// Schedules of a trip not yet assigned to any day
    Storage { trip_id: i64 },
}

/// Minimal member projection used by placement computations
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct BucketEntry {
    pub id: i64,
    pub order_key: i64,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bucket::Day { day_id } => write!(f, "day:{day_id}"),
            Bucket::Storage { trip_id } => write!(f, "storage:{trip_id}"),
        }
    }
}

impl Bucket {
    /// The bucket a schedule currently sits in
    pub fn of(schedule: &Schedule) -> Self {
        match schedule.day_id {
            Some(day_id) => Bucket::Day { day_id },
            None => Bucket::Storage {
                trip_id: schedule.trip_id,
            },
        }
    }

    /// Whether `schedule` is currently a member of this bucket
    pub fn contains(&self, schedule: &Schedule) -> bool {
        *self == Bucket::of(schedule)
    }

    /// `day_id` column value for members of this bucket
    pub(crate) fn day_id(&self) -> Option<i64> {
        match self {
            Bucket::Day { day_id } => Some(*day_id),
            Bucket::Storage { .. } => None,
        }
    }

    /// WHERE fragment selecting members, with the bucket id bound as `?1`
    fn filter(&self, alias: &str) -> String {
        match self {
            Bucket::Day { .. } => format!("{alias}.day_id = ?1"),
            Bucket::Storage { .. } => {
                format!("{alias}.trip_id = ?1 AND {alias}.day_id IS NULL")
            }
        }
    }

    fn filter_id(&self) -> i64 {
        match self {
            Bucket::Day { day_id } => *day_id,
            Bucket::Storage { trip_id } => *trip_id,
        }
    }

    /// Check the bucket's parent row exists; returns the owning trip id
    pub async fn resolve(&self, conn: &mut SqliteConnection) -> Result<i64, PlacementError> {
        let trip_id: Option<i64> = match self {
            Bucket::Day { day_id } => {
                sqlx::query_scalar("SELECT trip_id FROM day WHERE id = ?1")
                    .bind(day_id)
                    .fetch_optional(&mut *conn)
                    .await?
            }
            Bucket::Storage { trip_id } => {
                sqlx::query_scalar("SELECT id FROM trip WHERE id = ?1")
                    .bind(trip_id)
                    .fetch_optional(&mut *conn)
                    .await?
            }
        };
        trip_id.ok_or_else(|| PlacementError::BucketNotFound(self.to_string()))
    }

    /// Members in listing order (ascending order key, id as tie-break)
    pub async fn members(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<BucketEntry>, PlacementError> {
        let sql = format!(
            "SELECT id, order_key FROM schedule WHERE {} ORDER BY order_key, id",
            self.filter("schedule")
        );
        let entries = sqlx::query_as::<_, BucketEntry>(&sql)
            .bind(self.filter_id())
            .fetch_all(conn)
            .await?;
        Ok(entries)
    }

    /// Number of members
    pub async fn count(&self, conn: &mut SqliteConnection) -> Result<u32, PlacementError> {
        let sql = format!(
            "SELECT COUNT(*) FROM schedule WHERE {}",
            self.filter("schedule")
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(self.filter_id())
            .fetch_one(conn)
            .await?;
        Ok(count as u32)
    }

    /// Largest order key currently in the bucket (`None` if empty)
    pub async fn max_key(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Option<i64>, PlacementError> {
        let sql = format!(
            "SELECT MAX(order_key) FROM schedule WHERE {}",
            self.filter("schedule")
        );
        let max: Option<i64> = sqlx::query_scalar(&sql)
            .bind(self.filter_id())
            .fetch_one(conn)
            .await?;
        Ok(max)
    }

    /// Neighbors of a zero-based rank: the members immediately before and
    /// after "insert so the new item becomes the nth". Out-of-range
    /// positions clamp to append ("drop at end of list"); this never fails
    /// for an existing bucket.
    pub async fn neighbors_at(
        &self,
        conn: &mut SqliteConnection,
        position: u32,
    ) -> Result<(Option<BucketEntry>, Option<BucketEntry>), PlacementError> {
        self.neighbors_at_excluding(conn, position, None).await
    }

    /// Same as [`neighbors_at`](Self::neighbors_at) but ignoring one member,
    /// used when repositioning a schedule inside its own bucket.
    pub async fn neighbors_at_excluding(
        &self,
        conn: &mut SqliteConnection,
        position: u32,
        exclude: Option<i64>,
    ) -> Result<(Option<BucketEntry>, Option<BucketEntry>), PlacementError> {
        let mut entries = self.members(conn).await?;
        if let Some(exclude) = exclude {
            entries.retain(|e| e.id != exclude);
        }
        let pos = (position as usize).min(entries.len());
        let lower = if pos > 0 {
            entries.get(pos - 1).copied()
        } else {
            None
        };
        let upper = entries.get(pos).copied();
        Ok((lower, upper))
    }
}
