use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::course::Course;
use crate::services::evaluator::CourseState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDetail {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub duration_seconds: i32,
    pub order_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDetail {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub videos: Vec<VideoDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDetail {
    pub course: Course,
    pub modules: Vec<ModuleDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollResponse {
    pub course_id: Uuid,
    pub enrolled: bool,
    pub already_enrolled: bool,
}

/// Progress headline shared by the student and coach dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressSummary {
    pub total_videos: usize,
    pub completed_videos: usize,
    pub total_modules: usize,
    pub completed_modules: usize,
    pub progress_percentage: i32,
    pub course_complete: bool,
}

impl From<&CourseState> for ProgressSummary {
    fn from(state: &CourseState) -> Self {
        Self {
            total_videos: state.total_videos,
            completed_videos: state.completed_videos,
            total_modules: state.modules.len(),
            completed_modules: state.completed_modules,
            progress_percentage: state.progress_percentage,
            course_complete: state.course_complete,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardCourse {
    pub course_id: Uuid,
    pub title: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub progress: ProgressSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProgressRow {
    pub student_id: Uuid,
    pub name: String,
    pub email: String,
    pub progress: ProgressSummary,
}
