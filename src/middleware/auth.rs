use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::user::Role;
use crate::utils::token::decode_session_token;

/// Identity of the caller, decoded from the bearer token and handed to every
/// protected handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
}

pub async fn require_student(req: Request, next: Next) -> Response {
    require_role(req, next, Role::Student).await
}

pub async fn require_coach(req: Request, next: Next) -> Response {
    require_role(req, next, Role::Coach).await
}

async fn require_role(mut req: Request, next: Next, role: Role) -> Response {
    let session = match session_from_headers(req.headers()) {
        Ok(session) => session,
        Err(code) => {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response();
        }
    };
    if session.role != role {
        return (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"}))).into_response();
    }
    req.extensions_mut().insert(session);
    next.run(req).await
}

fn session_from_headers(headers: &HeaderMap) -> Result<Session, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing_authorization")?;
    let auth_str = auth_header.to_str().map_err(|_| "bad_authorization")?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("unsupported_scheme")?;

    let config = crate::config::get_config();
    let claims = decode_session_token(&config.jwt_secret, token).map_err(|_| "invalid_token")?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "invalid_token")?;
    let role = claims
        .role
        .as_deref()
        .and_then(Role::parse)
        .ok_or("invalid_token")?;
    Ok(Session { user_id, role })
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = crate::error::Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .copied()
            .ok_or_else(|| crate::error::Error::Unauthorized("missing_session".to_string()))
    }
}
