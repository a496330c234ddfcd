use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::dto::progress_dto::NotificationQuery;
use crate::error::Result;
use crate::middleware::auth::Session;
use crate::models::notification::Notification;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>> {
    let rows = state
        .notification_service
        .list_for_student(session.user_id, query.unread_only.unwrap_or(false))
        .await?;
    Ok(Json(rows))
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    session: Session,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>> {
    let row = state
        .notification_service
        .mark_read(session.user_id, notification_id)
        .await?;
    Ok(Json(row))
}
