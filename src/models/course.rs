use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub coach_id: Option<Uuid>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Module {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// A video as placed inside a module (joined through `module_videos`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModuleVideo {
    pub id: Uuid,
    pub module_id: Uuid,
    pub order_index: i32,
    pub title: String,
    pub url: String,
    pub duration_seconds: i32,
}
