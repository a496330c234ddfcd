use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::dto::course_dto::StudentProgressRow;
use crate::dto::progress_dto::{GradeSubmissionRequest, GradeSubmissionResponse};
use crate::error::Result;
use crate::middleware::auth::Session;
use crate::AppState;

#[axum::debug_handler]
pub async fn course_students(
    State(state): State<AppState>,
    session: Session,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<StudentProgressRow>>> {
    let rows = state
        .dashboard_service
        .course_students(session.user_id, course_id)
        .await?;
    Ok(Json(rows))
}

#[axum::debug_handler]
pub async fn grade_submission(
    State(state): State<AppState>,
    session: Session,
    Path(submission_id): Path<Uuid>,
    Json(req): Json<GradeSubmissionRequest>,
) -> Result<Json<GradeSubmissionResponse>> {
    let graded = state
        .assignment_service
        .grade(session.user_id, submission_id, req.score)
        .await?;
    Ok(Json(graded))
}
