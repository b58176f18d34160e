//! Ordered-placement engine
//!
//! Keeps a strict, gap-tolerant linear order of schedules inside the two
//! bucket kinds of a trip: one bucket per day, plus the trip's temporary
//! storage. Inserts and moves compute a sparse order key from the target
//! position's neighbors; when the key space between neighbors is exhausted
//! the bucket is reflowed to canonical spacing and the placement retried
//! once.
//!
//! # 模块结构
//!
//! ```text
//! placement/
//! ├── order_key.rs   # 稀疏排序键运算 (midpoint / gap 常量)
//! ├── bucket.rs      # 桶抽象: 某一天 或 行程的临时保管箱
//! ├── place.rs       # 插入/移动的目标键计算
//! ├── reflow.rs      # 批量重排 + 整桶搬移 (drain)
//! └── service.rs     # 编排: 尝试 → 冲突 → reflow → 重试一次
//! ```
//!
//! Only this module writes `order_key` values. Everything else treats the
//! key as opaque and sorts by it.

pub mod bucket;
pub mod order_key;
pub mod place;
pub mod reflow;
pub mod service;

pub use bucket::{Bucket, BucketEntry};
pub use order_key::{ORDER_GAP, ORDER_KEY_MAX, ORDER_KEY_MIN, OrderKey, midpoint};
pub use place::Placement;
pub use service::{MoveOutcome, create_with_placement, move_with_placement};

use thiserror::Error;

/// Placement engine error types
#[derive(Debug, Error)]
pub enum PlacementError {
    /// An append stepped outside `[ORDER_KEY_MIN, ORDER_KEY_MAX]`
    #[error("order key range exceeded")]
    RangeExceeded,

    /// Adjacent keys leave no integer strictly between them
    #[error("no order key available between adjacent schedules")]
    MidpointConflict,

    #[error("schedule {0} not found")]
    ScheduleNotFound(i64),

    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// Placement failed again immediately after a reflow. Reflow guarantees
    /// `ORDER_GAP` spacing, so this indicates broken spacing constants or
    /// concurrency control, not a user-correctable condition.
    #[error("placement failed after reflow")]
    RetryExhausted,

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for PlacementError {
    fn from(err: sqlx::Error) -> Self {
        // A lost race on the per-bucket unique index surfaces as a conflict
        // and takes the same reflow + retry path as a midpoint collision.
        if err
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation())
        {
            return PlacementError::MidpointConflict;
        }
        PlacementError::Database(err.to_string())
    }
}

impl PlacementError {
    /// Recoverable by reflowing the target bucket and retrying once
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::RangeExceeded | Self::MidpointConflict)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::bucket::Bucket;

    pub const TRIP: i64 = 1;
    pub const DAY1: i64 = 11;
    pub const DAY2: i64 = 12;

    /// In-memory SQLite pool with the schema and a seeded trip:
    /// trip 1 with day 11 (2025-03-01) and day 12 (2025-03-02).
    pub async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE trip (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                start_date TEXT,
                end_date TEXT,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE day (
                id INTEGER PRIMARY KEY,
                trip_id INTEGER NOT NULL REFERENCES trip(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                UNIQUE (trip_id, date)
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE schedule (
                id INTEGER PRIMARY KEY,
                trip_id INTEGER NOT NULL REFERENCES trip(id) ON DELETE CASCADE,
                day_id INTEGER REFERENCES day(id),
                order_key INTEGER NOT NULL,
                title TEXT NOT NULL,
                place TEXT,
                content TEXT,
                start_at INTEGER,
                end_at INTEGER,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE UNIQUE INDEX idx_schedule_day_key
                ON schedule (day_id, order_key) WHERE day_id IS NOT NULL",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "CREATE UNIQUE INDEX idx_schedule_storage_key
                ON schedule (trip_id, order_key) WHERE day_id IS NULL",
        )
        .execute(&pool)
        .await
        .unwrap();

        // Seed: one trip with a two-day period
        sqlx::query(
            "INSERT INTO trip (id, owner_id, title, start_date, end_date)
             VALUES (1, 1, 'Osaka', '2025-03-01', '2025-03-02')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO day (id, trip_id, date) VALUES (11, 1, '2025-03-01')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO day (id, trip_id, date) VALUES (12, 1, '2025-03-02')")
            .execute(&pool)
            .await
            .unwrap();

        pool
    }

    /// Seed a schedule row directly, bypassing the placement engine
    pub async fn insert_schedule(pool: &SqlitePool, id: i64, day_id: Option<i64>, order_key: i64) {
        sqlx::query(
            "INSERT INTO schedule (id, trip_id, day_id, order_key, title)
             VALUES (?1, 1, ?2, ?3, 'seeded')",
        )
        .bind(id)
        .bind(day_id)
        .bind(order_key)
        .execute(pool)
        .await
        .unwrap();
    }

    /// Bucket contents as `(id, order_key)` pairs in listing order.
    ///
    /// Takes the caller's connection: the pool is capped at one connection
    /// (each `sqlite::memory:` connection is its own database), so holding
    /// a second one would deadlock.
    pub async fn listing(conn: &mut sqlx::SqliteConnection, bucket: &Bucket) -> Vec<(i64, i64)> {
        bucket
            .members(conn)
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.id, e.order_key))
            .collect()
    }
}
