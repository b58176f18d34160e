//! Bulk Reflow Operations
//!
//! The two bulk writers of order keys: renumbering one bucket back to
//! canonical spacing, and draining a whole bucket into another bucket's
//! tail. Callers run these inside a transaction; SQLite's single-writer
//! model keeps them atomic with respect to concurrent bucket readers.

use shared::util::now_millis;
use sqlx::SqliteConnection;

use super::PlacementError;
use super::bucket::Bucket;
use super::order_key::{ORDER_GAP, ORDER_KEY_MAX, ORDER_KEY_MIN};

/// Renumber all members of `bucket` in their current listing order to the
/// canonical sequence `0, GAP, 2*GAP, ...`. Returns the number of rows
/// rewritten. Reflowing an already-canonical bucket rewrites the same
/// values.
pub async fn reflow_bucket(
    conn: &mut SqliteConnection,
    bucket: &Bucket,
) -> Result<u64, PlacementError> {
    let entries = bucket.members(&mut *conn).await?;
    if entries.is_empty() {
        return Ok(0);
    }
    let now = now_millis();

    // Two passes: park every key below the legal range first, so the final
    // renumbering can never collide with a not-yet-rewritten key on the
    // per-bucket unique index.
    for (i, entry) in entries.iter().enumerate() {
        sqlx::query("UPDATE schedule SET order_key = ?1 WHERE id = ?2")
            .bind(ORDER_KEY_MIN - 1 - i as i64)
            .bind(entry.id)
            .execute(&mut *conn)
            .await?;
    }
    for (i, entry) in entries.iter().enumerate() {
        sqlx::query("UPDATE schedule SET order_key = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(ORDER_GAP * i as i64)
            .bind(now)
            .bind(entry.id)
            .execute(&mut *conn)
            .await?;
    }

    tracing::debug!(bucket = %bucket, rows = entries.len(), "bucket reflowed");
    Ok(entries.len() as u64)
}

/// Move every member of `source` to the tail of `dest`, preserving the
/// relative order they had in `source`. New keys continue from the
/// destination's largest key in `ORDER_GAP` steps, so a drain leaves the
/// destination canonically spaced and needs no follow-up reflow.
pub async fn drain_to_tail(
    conn: &mut SqliteConnection,
    source: &Bucket,
    dest: &Bucket,
) -> Result<u64, PlacementError> {
    let dest_trip = dest.resolve(&mut *conn).await?;
    let entries = source.members(&mut *conn).await?;
    if entries.is_empty() {
        return Ok(0);
    }

    let needed = ORDER_GAP * entries.len() as i64;
    let mut base = dest.max_key(&mut *conn).await?.unwrap_or(0);
    if base > ORDER_KEY_MAX - needed {
        // Tail would run out of range: compact the destination, then append.
        reflow_bucket(&mut *conn, dest).await?;
        base = dest.max_key(&mut *conn).await?.unwrap_or(0);
        if base > ORDER_KEY_MAX - needed {
            return Err(PlacementError::RangeExceeded);
        }
    }

    let now = now_millis();
    for (i, entry) in entries.iter().enumerate() {
        sqlx::query(
            "UPDATE schedule SET trip_id = ?1, day_id = ?2, order_key = ?3, updated_at = ?4
             WHERE id = ?5",
        )
        .bind(dest_trip)
        .bind(dest.day_id())
        .bind(base + ORDER_GAP * (i as i64 + 1))
        .bind(now)
        .bind(entry.id)
        .execute(&mut *conn)
        .await?;
    }

    tracing::debug!(
        source = %source,
        dest = %dest,
        rows = entries.len(),
        "bucket drained to tail"
    );
    Ok(entries.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{DAY1, DAY2, TRIP, insert_schedule, listing, test_pool};
    use super::*;

    #[tokio::test]
    async fn reflow_restores_canonical_spacing() {
        let pool = test_pool().await;
        insert_schedule(&pool, 103, Some(DAY1), 40).await;
        insert_schedule(&pool, 101, Some(DAY1), 3).await;
        insert_schedule(&pool, 102, Some(DAY1), 5).await;
        let bucket = Bucket::Day { day_id: DAY1 };

        let mut conn = pool.acquire().await.unwrap();
        let rows = reflow_bucket(&mut conn, &bucket).await.unwrap();

        assert_eq!(rows, 3);
        assert_eq!(
            listing(&mut conn, &bucket).await,
            vec![(101, 0), (102, ORDER_GAP), (103, 2 * ORDER_GAP)]
        );
    }

    #[tokio::test]
    async fn reflow_is_idempotent() {
        let pool = test_pool().await;
        insert_schedule(&pool, 101, Some(DAY1), 7).await;
        insert_schedule(&pool, 102, Some(DAY1), 9).await;
        let bucket = Bucket::Day { day_id: DAY1 };

        let mut conn = pool.acquire().await.unwrap();
        reflow_bucket(&mut conn, &bucket).await.unwrap();
        let first = listing(&mut conn, &bucket).await;
        reflow_bucket(&mut conn, &bucket).await.unwrap();
        assert_eq!(listing(&mut conn, &bucket).await, first);
    }

    #[tokio::test]
    async fn reflow_survives_target_key_overlap() {
        // 102's target key (GAP) equals 103's current key: without the
        // parking pass this trips the unique index mid-renumber.
        let pool = test_pool().await;
        insert_schedule(&pool, 101, Some(DAY1), 3).await;
        insert_schedule(&pool, 102, Some(DAY1), 7).await;
        insert_schedule(&pool, 103, Some(DAY1), ORDER_GAP).await;
        let bucket = Bucket::Day { day_id: DAY1 };

        let mut conn = pool.acquire().await.unwrap();
        reflow_bucket(&mut conn, &bucket).await.unwrap();
        assert_eq!(
            listing(&mut conn, &bucket).await,
            vec![(101, 0), (102, ORDER_GAP), (103, 2 * ORDER_GAP)]
        );
    }

    #[tokio::test]
    async fn reflow_of_empty_bucket_is_a_noop() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let rows = reflow_bucket(&mut conn, &Bucket::Day { day_id: DAY1 })
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn drain_preserves_relative_order_across_merged_sources() {
        // Day1 [x, y], Day2 [z], storage [w] — draining day1 then day2
        // (ascending date) must yield [w, x, y, z] at canonical spacing.
        let pool = test_pool().await;
        insert_schedule(&pool, 1, Some(DAY1), 0).await; // x
        insert_schedule(&pool, 2, Some(DAY1), 10).await; // y
        insert_schedule(&pool, 3, Some(DAY2), 0).await; // z
        insert_schedule(&pool, 4, None, 0).await; // w
        let storage = Bucket::Storage { trip_id: TRIP };

        let mut conn = pool.acquire().await.unwrap();
        drain_to_tail(&mut conn, &Bucket::Day { day_id: DAY1 }, &storage)
            .await
            .unwrap();
        drain_to_tail(&mut conn, &Bucket::Day { day_id: DAY2 }, &storage)
            .await
            .unwrap();

        assert_eq!(
            listing(&mut conn, &storage).await,
            vec![
                (4, 0),
                (1, ORDER_GAP),
                (2, 2 * ORDER_GAP),
                (3, 3 * ORDER_GAP),
            ]
        );
        assert_eq!(
            Bucket::Day { day_id: DAY1 }.count(&mut conn).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn drain_into_empty_destination_starts_at_gap() {
        let pool = test_pool().await;
        insert_schedule(&pool, 1, Some(DAY1), 50).await;
        let storage = Bucket::Storage { trip_id: TRIP };

        let mut conn = pool.acquire().await.unwrap();
        let moved = drain_to_tail(&mut conn, &Bucket::Day { day_id: DAY1 }, &storage)
            .await
            .unwrap();

        assert_eq!(moved, 1);
        assert_eq!(listing(&mut conn, &storage).await, vec![(1, ORDER_GAP)]);
    }

    #[tokio::test]
    async fn drain_of_empty_source_leaves_destination_untouched() {
        let pool = test_pool().await;
        insert_schedule(&pool, 4, None, 123).await;
        let storage = Bucket::Storage { trip_id: TRIP };

        let mut conn = pool.acquire().await.unwrap();
        let moved = drain_to_tail(&mut conn, &Bucket::Day { day_id: DAY1 }, &storage)
            .await
            .unwrap();

        assert_eq!(moved, 0);
        assert_eq!(listing(&mut conn, &storage).await, vec![(4, 123)]);
    }

    #[tokio::test]
    async fn drain_near_key_range_end_compacts_destination_first() {
        let pool = test_pool().await;
        insert_schedule(&pool, 1, Some(DAY1), 0).await;
        insert_schedule(&pool, 4, None, ORDER_KEY_MAX - 1).await;
        let storage = Bucket::Storage { trip_id: TRIP };

        let mut conn = pool.acquire().await.unwrap();
        drain_to_tail(&mut conn, &Bucket::Day { day_id: DAY1 }, &storage)
            .await
            .unwrap();

        // Destination was reflowed to [0] before the append
        assert_eq!(
            listing(&mut conn, &storage).await,
            vec![(4, 0), (1, ORDER_GAP)]
        );
    }

    #[tokio::test]
    async fn drain_into_unknown_bucket_is_not_found() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let err = drain_to_tail(
            &mut conn,
            &Bucket::Day { day_id: DAY1 },
            &Bucket::Day { day_id: 999 },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PlacementError::BucketNotFound(_)));
    }
}
