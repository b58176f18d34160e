//! Trip API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::{day, schedule, trip};
use crate::utils::{AppError, AppResult};
use shared::models::{Day, Schedule, Trip, TripCreate, TripPeriodUpdate};

#[derive(Deserialize)]
pub struct ListQuery {
    pub owner_id: i64,
}

/// Trip with its days (schedules attached) and temporary storage
#[derive(Serialize)]
pub struct TripDetail {
    #[serde(flatten)]
    pub trip: Trip,
    pub days: Vec<Day>,
    pub storage: Vec<Schedule>,
}

/// GET /api/trips?owner_id=... - 获取用户的所有行程
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Trip>>> {
    let trips = trip::find_by_owner(&state.db.pool, query.owner_id).await?;
    Ok(Json(trips))
}

/// GET /api/trips/{id} - 获取行程详情 (天 + 保管箱)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TripDetail>> {
    let trip = trip::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Trip {id} not found")))?;
    let days = day::find_by_trip_with_schedules(&state.db.pool, id).await?;
    let storage = schedule::find_storage(&state.db.pool, id).await?;
    Ok(Json(TripDetail {
        trip,
        days,
        storage,
    }))
}

/// POST /api/trips - 创建行程
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TripCreate>,
) -> AppResult<Json<Trip>> {
    let trip = trip::create(&state.db.pool, payload).await?;
    Ok(Json(trip))
}

/// PUT /api/trips/{id}/period - 更新行程日期区间
///
/// 区间缩短时，被移除的那些天会先把日程搬到保管箱再删除。
pub async fn set_period(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TripPeriodUpdate>,
) -> AppResult<Json<Trip>> {
    let trip = trip::set_period(&state.db.pool, id, payload).await?;
    Ok(Json(trip))
}

/// DELETE /api/trips/{id} - 删除行程
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = trip::delete(&state.db.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Trip {id} not found")));
    }
    Ok(Json(true))
}
