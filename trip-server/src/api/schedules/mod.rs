//! Schedule API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/schedules", routes())
        // Bucket listings
        .route("/api/days/{day_id}/schedules", get(handler::list_day))
        .route("/api/trips/{trip_id}/storage", get(handler::list_storage))
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        // Ordering is changed only here, never via update
        .route("/{id}/position", put(handler::move_schedule))
}
