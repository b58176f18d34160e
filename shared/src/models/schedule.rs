//! Schedule Model

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Schedule entity
///
/// Belongs to exactly one trip and either one day of that trip or the trip's
/// temporary storage (`day_id = None`). Listing order inside a day / the
/// temporary storage is ascending `order_key`; the key itself is opaque to
/// everything except the placement engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Schedule {
    pub id: i64,
    pub trip_id: i64,
    /// Owning day; `None` ⇒ temporary storage
    pub day_id: Option<i64>,
    /// Sparse sort key, unique within its bucket
    pub order_key: i64,
    pub title: String,
    pub place: Option<String>,
    pub content: Option<String>,
    /// Planned start (Unix millis)
    pub start_at: Option<Timestamp>,
    /// Planned end (Unix millis)
    pub end_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create schedule payload (descriptive fields; placement is requested
/// separately via bucket + position)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCreate {
    pub title: String,
    pub place: Option<String>,
    pub content: Option<String>,
    pub start_at: Option<i64>,
    pub end_at: Option<i64>,
}

/// Update schedule payload — descriptive fields only.
/// Ordering changes go through the move endpoint, never through update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub title: Option<String>,
    pub place: Option<String>,
    pub content: Option<String>,
    pub start_at: Option<i64>,
    pub end_at: Option<i64>,
}
