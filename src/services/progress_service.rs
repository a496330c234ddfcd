use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::progress_dto::RecordWatchRequest;
use crate::error::{Error, Result};
use crate::models::assignment::GradedSubmission;
use crate::models::notification::AchievementKind;
use crate::models::progress::{ModuleSubscription, VideoProgress};
use crate::models::question::VideoAnswer;
use crate::services::catalog_service::CatalogService;
use crate::services::enrollment_service::EnrollmentService;
use crate::services::evaluator::{CourseState, CourseTree, Evaluator, ProgressSnapshot};
use crate::services::notification_service::NotificationService;

const COURSE_VIDEO_IDS: &str = r#"
    SELECT mv.video_id FROM module_videos mv
    JOIN modules m ON m.id = mv.module_id
    WHERE m.course_id = $2
"#;

#[derive(Clone)]
pub struct ProgressService {
    pool: PgPool,
    evaluator: Evaluator,
    catalog: CatalogService,
    enrollments: EnrollmentService,
    notifications: NotificationService,
}

impl ProgressService {
    pub fn new(pool: PgPool, evaluator: Evaluator) -> Self {
        Self {
            catalog: CatalogService::new(pool.clone()),
            enrollments: EnrollmentService::new(pool.clone()),
            notifications: NotificationService::new(pool.clone()),
            pool,
            evaluator,
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Reads every progress row the evaluator needs for one student and course.
    pub async fn snapshot(&self, student_id: Uuid, course_id: Uuid) -> Result<ProgressSnapshot> {
        let progress = sqlx::query_as::<_, VideoProgress>(&format!(
            r#"SELECT * FROM student_video_progress
               WHERE student_id = $1 AND video_id IN ({})"#,
            COURSE_VIDEO_IDS
        ))
        .bind(student_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let subscriptions = sqlx::query_as::<_, ModuleSubscription>(
            r#"
            SELECT ms.* FROM module_subscriptions ms
            JOIN modules m ON m.id = ms.module_id
            WHERE ms.student_id = $1 AND m.course_id = $2
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let answers = sqlx::query_as::<_, VideoAnswer>(&format!(
            r#"SELECT q.video_id, a.question_id, a.is_correct
               FROM student_verification_answers a
               JOIN video_verification_questions q ON q.id = a.question_id
               WHERE a.student_id = $1 AND q.video_id IN ({})"#,
            COURSE_VIDEO_IDS
        ))
        .bind(student_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let submissions = sqlx::query_as::<_, GradedSubmission>(&format!(
            r#"SELECT a.video_id, s.assignment_id, s.score, a.max_score
               FROM assignment_submissions s
               JOIN assignments a ON a.id = s.assignment_id
               WHERE s.student_id = $1 AND a.video_id IN ({})"#,
            COURSE_VIDEO_IDS
        ))
        .bind(student_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProgressSnapshot::from_rows(
            &progress,
            &subscriptions,
            &answers,
            &submissions,
        ))
    }

    pub async fn evaluate(&self, student_id: Uuid, tree: &CourseTree) -> Result<CourseState> {
        let snapshot = self.snapshot(student_id, tree.course_id).await?;
        Ok(self.evaluator.evaluate(tree, &snapshot))
    }

    /// Gating state of a course for an enrolled student.
    pub async fn course_state(&self, student_id: Uuid, course_id: Uuid) -> Result<CourseState> {
        self.enrollments.require_enrollment(student_id, course_id).await?;
        let tree = self.catalog.load_tree(course_id).await?;
        self.evaluate(student_id, &tree).await
    }

    pub async fn course_for_video(&self, video_id: Uuid) -> Result<Uuid> {
        self.catalog.course_for_video(video_id).await
    }

    /// Coaches act on their own courses; a course without an owner is open to
    /// every coach.
    pub async fn ensure_coach_owns(&self, coach_id: Uuid, course_id: Uuid) -> Result<()> {
        let course = self.catalog.get_course(course_id).await?;
        match course.coach_id {
            Some(owner) if owner != coach_id => Err(Error::Forbidden("forbidden".to_string())),
            _ => Ok(()),
        }
    }

    /// Fails with `content_locked` unless the video is playable for the
    /// student right now. Returns the course the video was resolved in.
    pub async fn ensure_video_unlocked(&self, student_id: Uuid, video_id: Uuid) -> Result<Uuid> {
        let course_id = self.catalog.course_for_video(video_id).await?;
        let state = self.course_state(student_id, course_id).await?;
        match state.video(video_id) {
            Some((_, video)) if video.unlocked => Ok(course_id),
            Some(_) => Err(Error::Forbidden("content_locked".to_string())),
            None => Err(Error::NotFound("Video not found".to_string())),
        }
    }

    /// Periodic watch report. Both counters only ever grow, so a late write
    /// carrying older values cannot roll progress back.
    pub async fn record_watch(
        &self,
        student_id: Uuid,
        video_id: Uuid,
        req: &RecordWatchRequest,
    ) -> Result<VideoProgress> {
        let course_id = self.ensure_video_unlocked(student_id, video_id).await?;

        let progress = sqlx::query_as::<_, VideoProgress>(
            r#"
            INSERT INTO student_video_progress (student_id, video_id, watch_time_seconds, completion_percentage)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, video_id) DO UPDATE SET
                watch_time_seconds = GREATEST(student_video_progress.watch_time_seconds, EXCLUDED.watch_time_seconds),
                completion_percentage = GREATEST(student_video_progress.completion_percentage, EXCLUDED.completion_percentage),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(video_id)
        .bind(req.watch_time_seconds)
        .bind(req.completion_percentage)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            %student_id,
            %video_id,
            completion_percentage = progress.completion_percentage,
            "watch progress recorded"
        );

        if progress.completed_at.is_some() {
            self.after_video_event(student_id, course_id, video_id).await;
        }
        Ok(progress)
    }

    /// Stamps `completed_at` the first time; repeated calls keep the original.
    pub async fn mark_video_complete(&self, student_id: Uuid, video_id: Uuid) -> Result<VideoProgress> {
        let course_id = self.ensure_video_unlocked(student_id, video_id).await?;

        let progress = sqlx::query_as::<_, VideoProgress>(
            r#"
            INSERT INTO student_video_progress (student_id, video_id, completed_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (student_id, video_id) DO UPDATE SET
                completed_at = COALESCE(student_video_progress.completed_at, EXCLUDED.completed_at),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(video_id)
        .fetch_one(&self.pool)
        .await?;

        if progress.completion_percentage < self.evaluator.watch_threshold() {
            tracing::info!(
                %student_id,
                %video_id,
                completion_percentage = progress.completion_percentage,
                threshold = self.evaluator.watch_threshold(),
                "video marked complete below watch threshold"
            );
        }

        self.after_video_event(student_id, course_id, video_id).await;
        Ok(progress)
    }

    /// Runs after anything that can make a video fully complete. When every
    /// video of the module is done the student gets an achievement and a
    /// prompt to confirm the module. Never fails the caller.
    pub async fn after_video_event(&self, student_id: Uuid, course_id: Uuid, video_id: Uuid) {
        let state = match self.load_state_unchecked(student_id, course_id).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = ?e, %student_id, %video_id, "could not re-evaluate progress");
                return;
            }
        };
        let Some((module, _)) = state.video(video_id) else {
            return;
        };
        if module.all_videos_complete && !module.complete {
            self.notifications
                .celebrate(
                    student_id,
                    AchievementKind::ModuleVideosCompleted,
                    module.module_id,
                    "All videos completed",
                    &format!(
                        "You finished every video in \"{}\". Confirm the module to unlock the next one.",
                        module.title
                    ),
                )
                .await;
        }
    }

    async fn load_state_unchecked(&self, student_id: Uuid, course_id: Uuid) -> Result<CourseState> {
        let tree = self.catalog.load_tree(course_id).await?;
        self.evaluate(student_id, &tree).await
    }

    /// Stamps the module as confirmed. Callers must run
    /// `check_module_confirmable` first.
    pub(crate) async fn confirm_module(&self, student_id: Uuid, module_id: Uuid) -> Result<ModuleSubscription> {
        let row = sqlx::query_as::<_, ModuleSubscription>(
            r#"
            INSERT INTO module_subscriptions (student_id, module_id, completed_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (student_id, module_id) DO UPDATE SET
                completed_at = COALESCE(module_subscriptions.completed_at, EXCLUDED.completed_at)
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(module_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
