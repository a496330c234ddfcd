use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::notification::AchievementKind;
use crate::services::catalog_service::CatalogService;
use crate::services::enrollment_service::EnrollmentService;
use crate::services::evaluator::CourseState;
use crate::services::notification_service::NotificationService;
use crate::services::progress_service::ProgressService;

/// Something a student can mark as completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "id", rename_all = "snake_case")]
pub enum CompletionTarget {
    Video(Uuid),
    Module(Uuid),
    Course(Uuid),
}

impl CompletionTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionTarget::Video(_) => "video",
            CompletionTarget::Module(_) => "module",
            CompletionTarget::Course(_) => "course",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            CompletionTarget::Video(id) | CompletionTarget::Module(id) | CompletionTarget::Course(id) => *id,
        }
    }
}

/// Checks that a module may be confirmed: it is unlocked and every one of
/// its videos is fully complete.
pub fn check_module_confirmable(state: &CourseState, module_id: Uuid) -> Result<()> {
    let module = state
        .module(module_id)
        .ok_or_else(|| Error::NotFound("Module not found".to_string()))?;
    if !module.unlocked {
        return Err(Error::Forbidden("content_locked".to_string()));
    }
    if !module.all_videos_complete {
        let remaining = module.videos.iter().filter(|v| !v.fully_complete).count();
        return Err(Error::Conflict(format!(
            "precondition_failed: {} video(s) in this module are not fully complete",
            remaining
        )));
    }
    Ok(())
}

/// Checks that every module of the course has been confirmed.
pub fn check_course_completable(state: &CourseState) -> Result<()> {
    let remaining = state.modules.iter().filter(|m| !m.complete).count();
    if state.modules.is_empty() || remaining > 0 {
        return Err(Error::Conflict(format!(
            "precondition_failed: {} module(s) are not complete",
            remaining
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CompletionService {
    progress: ProgressService,
    catalog: CatalogService,
    enrollments: EnrollmentService,
    notifications: NotificationService,
}

impl CompletionService {
    pub fn new(
        progress: ProgressService,
        catalog: CatalogService,
        enrollments: EnrollmentService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            progress,
            catalog,
            enrollments,
            notifications,
        }
    }

    /// Single entry point for every "mark complete" action.
    pub async fn complete(&self, student_id: Uuid, target: CompletionTarget) -> Result<DateTime<Utc>> {
        tracing::info!(%student_id, target = target.kind(), id = %target.id(), "completion requested");
        match target {
            CompletionTarget::Video(video_id) => self.complete_video(student_id, video_id).await,
            CompletionTarget::Module(module_id) => self.complete_module(student_id, module_id).await,
            CompletionTarget::Course(course_id) => self.complete_course(student_id, course_id).await,
        }
    }

    async fn complete_video(&self, student_id: Uuid, video_id: Uuid) -> Result<DateTime<Utc>> {
        let progress = self.progress.mark_video_complete(student_id, video_id).await?;
        progress
            .completed_at
            .ok_or_else(|| Error::Internal("completion timestamp missing after update".to_string()))
    }

    async fn complete_module(&self, student_id: Uuid, module_id: Uuid) -> Result<DateTime<Utc>> {
        let course_id = self.catalog.course_for_module(module_id).await?;
        let state = self.progress.course_state(student_id, course_id).await?;
        check_module_confirmable(&state, module_id)?;

        let subscription = self.progress.confirm_module(student_id, module_id).await?;
        let completed_at = subscription
            .completed_at
            .ok_or_else(|| Error::Internal("completion timestamp missing after update".to_string()))?;

        let title = state
            .module(module_id)
            .map(|m| m.title.clone())
            .unwrap_or_default();
        self.notifications
            .celebrate(
                student_id,
                AchievementKind::ModuleCompleted,
                module_id,
                "Module completed",
                &format!("You completed \"{}\". The next module is now unlocked.", title),
            )
            .await;
        Ok(completed_at)
    }

    async fn complete_course(&self, student_id: Uuid, course_id: Uuid) -> Result<DateTime<Utc>> {
        let state = self.progress.course_state(student_id, course_id).await?;
        check_course_completable(&state)?;

        let enrollment = self.enrollments.mark_course_completed(student_id, course_id).await?;
        let completed_at = enrollment
            .completed_at
            .ok_or_else(|| Error::Internal("completion timestamp missing after update".to_string()))?;

        let course = self.catalog.get_course(course_id).await?;
        self.notifications
            .celebrate(
                student_id,
                AchievementKind::CourseCompleted,
                course_id,
                "Course completed",
                &format!("Congratulations on completing \"{}\"!", course.title),
            )
            .await;
        Ok(completed_at)
    }
}
