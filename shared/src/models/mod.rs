//! Data models
//!
//! Shared between trip-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY, snowflake-generated).

pub mod day;
pub mod schedule;
pub mod trip;

// Re-exports
pub use day::*;
pub use schedule::*;
pub use trip::*;
