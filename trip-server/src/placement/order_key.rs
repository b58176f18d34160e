//! Order Key Arithmetic
//!
//! Schedules inside a bucket are ordered by a sparse signed-integer key.
//! Inserting between two neighbors takes the integer midpoint of their keys;
//! appending steps by [`ORDER_GAP`]. Both fail in well-defined ways
//! (`MidpointConflict`, `RangeExceeded`) that the move orchestrator recovers
//! from by reflowing the bucket.

use super::PlacementError;

/// Sparse sort key for schedules within a bucket
pub type OrderKey = i64;

/// Lowest assignable order key
pub const ORDER_KEY_MIN: OrderKey = -5_000_000_000_000_000_000;
/// Highest assignable order key
pub const ORDER_KEY_MAX: OrderKey = 5_000_000_000_000_000_000;
/// Canonical spacing between adjacent keys after a reflow
pub const ORDER_GAP: OrderKey = 10_000_000;

/// Compute a key strictly between `lower` and `upper`.
///
/// `None` means unbounded on that side:
/// - neither bound: first key of an empty bucket, [`ORDER_GAP`]
/// - only `lower`: append, `lower + ORDER_GAP`
/// - only `upper`: prepend, `upper - ORDER_GAP`
/// - both: `lower + floor((upper - lower) / 2)`
pub fn midpoint(
    lower: Option<OrderKey>,
    upper: Option<OrderKey>,
) -> Result<OrderKey, PlacementError> {
    match (lower, upper) {
        (None, None) => Ok(ORDER_GAP),
        (Some(lo), None) => {
            if lo > ORDER_KEY_MAX - ORDER_GAP {
                return Err(PlacementError::RangeExceeded);
            }
            Ok(lo + ORDER_GAP)
        }
        (None, Some(up)) => {
            if up < ORDER_KEY_MIN + ORDER_GAP {
                return Err(PlacementError::RangeExceeded);
            }
            Ok(up - ORDER_GAP)
        }
        (Some(lo), Some(up)) => {
            debug_assert!(lo < up, "neighbor keys out of order: {lo} >= {up}");
            // i128: the full span MAX - MIN does not fit in i64
            let span = up as i128 - lo as i128;
            if span <= 1 {
                return Err(PlacementError::MidpointConflict);
            }
            Ok((lo as i128 + span / 2) as OrderKey)
        }
    }
}
