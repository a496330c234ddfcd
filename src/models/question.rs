use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VerificationQuestion {
    pub id: Uuid,
    pub video_id: Uuid,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: String,
    pub created_at: DateTime<Utc>,
}

impl VerificationQuestion {
    pub fn options(&self) -> [&str; 4] {
        [
            self.option_a.as_str(),
            self.option_b.as_str(),
            self.option_c.as_str(),
            self.option_d.as_str(),
        ]
    }

    /// Answers are checked by exact string equality against the stored
    /// correct option.
    pub fn is_correct(&self, selected_option: &str) -> bool {
        self.correct_option == selected_option
    }
}

/// What a student is allowed to see of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub video_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub answered: bool,
    pub answered_correctly: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VerificationAnswer {
    pub student_id: Uuid,
    pub question_id: Uuid,
    pub selected_option: String,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// Answer joined with the video its question belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VideoAnswer {
    pub video_id: Uuid,
    pub question_id: Uuid,
    pub is_correct: bool,
}
