//! Shared types for the trip planner
//!
//! Common types used by the server and API clients: data models,
//! timestamp/ID utilities.

pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
