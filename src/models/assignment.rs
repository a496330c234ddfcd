use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fraction of `max_score` a submission needs to pass (0.70).
pub fn pass_ratio() -> Decimal {
    Decimal::new(70, 2)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: Uuid,
    pub video_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub max_score: Decimal,
    pub is_required: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssignmentSubmission {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub content: String,
    pub score: Option<Decimal>,
    pub graded_by: Option<Uuid>,
    pub graded_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
}

/// Submission joined with its assignment's max score and video.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GradedSubmission {
    pub video_id: Uuid,
    pub assignment_id: Uuid,
    pub score: Option<Decimal>,
    pub max_score: Decimal,
}

pub fn is_passing(score: Decimal, max_score: Decimal) -> bool {
    if max_score <= Decimal::ZERO {
        return false;
    }
    score / max_score >= pass_ratio()
}
