//! Schedule API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::schedule;
use crate::placement::{Bucket, MoveOutcome, create_with_placement, move_with_placement};
use crate::utils::AppResult;
use shared::models::{Schedule, ScheduleCreate, ScheduleUpdate};

/// Create request: descriptive fields plus the target slot
#[derive(Deserialize)]
pub struct ScheduleCreateRequest {
    #[serde(flatten)]
    pub data: ScheduleCreate,
    pub bucket: Bucket,
    /// Zero-based rank in the bucket; past-the-end appends
    pub position: u32,
}

/// Move request: the target slot only
#[derive(Deserialize)]
pub struct ScheduleMoveRequest {
    pub bucket: Bucket,
    pub position: u32,
}

/// POST /api/schedules - 创建日程并插入到指定位置
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ScheduleCreateRequest>,
) -> AppResult<Json<Schedule>> {
    let created = create_with_placement(
        &state.db.pool,
        &payload.bucket,
        payload.position,
        &payload.data,
    )
    .await?;
    Ok(Json(created))
}

/// PUT /api/schedules/{id}/position - 移动日程 (同桶排序或跨桶)
pub async fn move_schedule(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ScheduleMoveRequest>,
) -> AppResult<Json<MoveOutcome>> {
    let outcome =
        move_with_placement(&state.db.pool, id, &payload.bucket, payload.position).await?;
    Ok(Json(outcome))
}

/// PUT /api/schedules/{id} - 更新日程描述字段
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ScheduleUpdate>,
) -> AppResult<Json<Schedule>> {
    let updated = schedule::update(&state.db.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/schedules/{id} - 删除日程
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = schedule::delete(&state.db.pool, id).await?;
    Ok(Json(deleted))
}

/// GET /api/days/{day_id}/schedules - 某一天的日程 (排序键升序)
pub async fn list_day(
    State(state): State<ServerState>,
    Path(day_id): Path<i64>,
) -> AppResult<Json<Vec<Schedule>>> {
    let schedules = schedule::find_by_day(&state.db.pool, day_id).await?;
    Ok(Json(schedules))
}

/// GET /api/trips/{trip_id}/storage - 行程保管箱日程 (排序键升序)
pub async fn list_storage(
    State(state): State<ServerState>,
    Path(trip_id): Path<i64>,
) -> AppResult<Json<Vec<Schedule>>> {
    let schedules = schedule::find_storage(&state.db.pool, trip_id).await?;
    Ok(Json(schedules))
}
