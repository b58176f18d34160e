//! HTTP API
//!
//! 路由和处理器，按资源划分。Handlers are thin: parse the request, call the
//! repository or placement service, map errors into [`crate::utils::AppError`].

pub mod health;
pub mod schedules;
pub mod trips;

use axum::Router;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(health::router())
        // Trip CRUD + period lifecycle
        .merge(trips::router())
        // Schedule placement, listing and editing
        .merge(schedules::router())
}
