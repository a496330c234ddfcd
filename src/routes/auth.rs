use axum::{extract::State, Json};
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::error::Result;
use crate::AppState;

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    req.validate()?;
    let response = state.auth_service.login(&req).await?;
    Ok(Json(response))
}
