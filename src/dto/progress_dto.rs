use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordWatchRequest {
    #[validate(range(min = 0, message = "watch_time_seconds cannot be negative"))]
    pub watch_time_seconds: i32,
    #[validate(range(min = 0, max = 100, message = "completion_percentage must be 0-100"))]
    pub completion_percentage: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordWatchResponse {
    pub video_id: Uuid,
    pub watch_time_seconds: i32,
    pub completion_percentage: i32,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, message = "selected_option is required"))]
    pub selected_option: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitAnswerResponse {
    pub question_id: Uuid,
    pub video_id: Uuid,
    pub is_correct: bool,
    pub quiz_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAssignmentRequest {
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
}

/// Not validated here: the allowed range depends on the assignment's
/// `max_score`, so `AssignmentService::grade` checks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSubmissionRequest {
    pub score: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSubmissionResponse {
    pub submission_id: Uuid,
    pub score: Decimal,
    pub max_score: Decimal,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub target: String,
    pub id: Uuid,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQuery {
    pub unread_only: Option<bool>,
}
