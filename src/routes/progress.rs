use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::course_dto::DashboardCourse;
use crate::dto::progress_dto::{CompletionResponse, RecordWatchRequest, RecordWatchResponse};
use crate::error::Result;
use crate::middleware::auth::Session;
use crate::services::completion_service::CompletionTarget;
use crate::AppState;

#[axum::debug_handler]
pub async fn record_watch(
    State(state): State<AppState>,
    session: Session,
    Path(video_id): Path<Uuid>,
    Json(req): Json<RecordWatchRequest>,
) -> Result<Json<RecordWatchResponse>> {
    req.validate()?;
    let progress = state
        .progress_service
        .record_watch(session.user_id, video_id, &req)
        .await?;
    Ok(Json(RecordWatchResponse {
        video_id,
        watch_time_seconds: progress.watch_time_seconds,
        completion_percentage: progress.completion_percentage,
        completed_at: progress.completed_at,
    }))
}

#[axum::debug_handler]
pub async fn complete(
    State(state): State<AppState>,
    session: Session,
    Json(target): Json<CompletionTarget>,
) -> Result<Json<CompletionResponse>> {
    let completed_at = state
        .completion_service
        .complete(session.user_id, target)
        .await?;
    Ok(Json(CompletionResponse {
        target: target.kind().to_string(),
        id: target.id(),
        completed_at,
    }))
}

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<DashboardCourse>>> {
    let courses = state
        .dashboard_service
        .student_dashboard(session.user_id)
        .await?;
    Ok(Json(courses))
}
