//! Day Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Schedule;

/// Day entity — one calendar date of a trip's period
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Day {
    pub id: i64,
    pub trip_id: i64,
    pub date: NaiveDate,

    // -- Relations (populated by application code, skipped by FromRow) --

    /// Schedules of this day in ascending order-key order
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}
