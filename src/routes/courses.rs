use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::course_dto::{CourseDetail, EnrollResponse};
use crate::error::Result;
use crate::middleware::auth::Session;
use crate::models::course::Course;
use crate::services::enrollment_service::EnrollOutcome;
use crate::services::evaluator::CourseState;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>> {
    let courses = state.catalog_service.list_courses().await?;
    Ok(Json(courses))
}

#[axum::debug_handler]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseDetail>> {
    let detail = state.catalog_service.course_detail(course_id).await?;
    Ok(Json(detail))
}

#[axum::debug_handler]
pub async fn enroll(
    State(state): State<AppState>,
    session: Session,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.catalog_service.get_course(course_id).await?;
    let outcome = state
        .enrollment_service
        .enroll(session.user_id, course_id)
        .await?;

    let status = match outcome {
        EnrollOutcome::Enrolled => StatusCode::CREATED,
        EnrollOutcome::AlreadyEnrolled => StatusCode::OK,
    };
    Ok((
        status,
        Json(EnrollResponse {
            course_id,
            enrolled: true,
            already_enrolled: outcome == EnrollOutcome::AlreadyEnrolled,
        }),
    ))
}

#[axum::debug_handler]
pub async fn course_state(
    State(state): State<AppState>,
    session: Session,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseState>> {
    let course_state = state
        .progress_service
        .course_state(session.user_id, course_id)
        .await?;
    Ok(Json(course_state))
}
