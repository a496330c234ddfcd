use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::Role;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    pub role: Role,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 4, max = 12, message = "PIN must be 4-12 characters"))]
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
}
