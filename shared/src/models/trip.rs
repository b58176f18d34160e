//! Trip Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Trip entity
///
/// A trip owns its days and schedules. The optional `[start_date, end_date]`
/// pair is the travel period; one `Day` row exists per date inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Trip {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    /// Period start (inclusive). Set together with `end_date` or not at all.
    pub start_date: Option<NaiveDate>,
    /// Period end (inclusive)
    pub end_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create trip payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripCreate {
    pub owner_id: i64,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Update trip period payload
///
/// Both dates set ⇒ new period; both `None` ⇒ period removed (all days are
/// drained into temporary storage).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPeriodUpdate {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
