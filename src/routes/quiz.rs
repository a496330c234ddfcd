use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::progress_dto::{SubmitAnswerRequest, SubmitAnswerResponse, SubmitAssignmentRequest};
use crate::error::Result;
use crate::middleware::auth::Session;
use crate::models::question::PublicQuestion;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    session: Session,
    Path(video_id): Path<Uuid>,
) -> Result<Json<Vec<PublicQuestion>>> {
    let questions = state
        .quiz_service
        .list_questions(session.user_id, video_id)
        .await?;
    Ok(Json(questions))
}

#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    session: Session,
    Path(question_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>> {
    req.validate()?;
    let outcome = state
        .quiz_service
        .submit_answer(session.user_id, question_id, &req.selected_option)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn submit_assignment(
    State(state): State<AppState>,
    session: Session,
    Path(assignment_id): Path<Uuid>,
    Json(req): Json<SubmitAssignmentRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let submission = state
        .assignment_service
        .submit(session.user_id, assignment_id, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}
