//! Trip API 模块

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/trips", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id).delete(handler::delete),
        )
        // Period drives day lifecycle: shrinking relocates day contents
        .route("/{id}/period", put(handler::set_period))
}
