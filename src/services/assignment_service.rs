use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::progress_dto::GradeSubmissionResponse;
use crate::error::{Error, Result};
use crate::models::assignment::{is_passing, Assignment, AssignmentSubmission};
use crate::services::progress_service::ProgressService;

#[derive(Clone)]
pub struct AssignmentService {
    pool: PgPool,
    progress: ProgressService,
}

impl AssignmentService {
    pub fn new(pool: PgPool, progress: ProgressService) -> Self {
        Self { pool, progress }
    }

    pub async fn get_assignment(&self, assignment_id: Uuid) -> Result<Assignment> {
        let row = sqlx::query_as::<_, Assignment>(r#"SELECT * FROM assignments WHERE id = $1"#)
            .bind(assignment_id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| Error::NotFound("Assignment not found".to_string()))
    }

    /// One submission per student and assignment. Resubmitting replaces the
    /// content and clears a failing grade; a passed submission is final.
    pub async fn submit(
        &self,
        student_id: Uuid,
        assignment_id: Uuid,
        content: &str,
    ) -> Result<AssignmentSubmission> {
        let assignment = self.get_assignment(assignment_id).await?;
        self.progress
            .ensure_video_unlocked(student_id, assignment.video_id)
            .await?;

        let submission = sqlx::query_as::<_, AssignmentSubmission>(
            r#"
            INSERT INTO assignment_submissions (assignment_id, student_id, content)
            VALUES ($1, $2, $3)
            ON CONFLICT (assignment_id, student_id) DO UPDATE SET
                content = EXCLUDED.content,
                score = NULL,
                graded_by = NULL,
                graded_at = NULL,
                submitted_at = NOW()
            WHERE assignment_submissions.score IS NULL
               OR assignment_submissions.score / $4 < 0.70
            RETURNING *
            "#,
        )
        .bind(assignment_id)
        .bind(student_id)
        .bind(content)
        .bind(assignment.max_score)
        .fetch_optional(&self.pool)
        .await?;

        match submission {
            Some(s) => {
                tracing::info!(%student_id, %assignment_id, "assignment submitted");
                Ok(s)
            }
            None => Err(Error::Conflict(
                "assignment already passed; resubmission is closed".to_string(),
            )),
        }
    }

    pub async fn grade(
        &self,
        coach_id: Uuid,
        submission_id: Uuid,
        score: Decimal,
    ) -> Result<GradeSubmissionResponse> {
        let submission = sqlx::query_as::<_, AssignmentSubmission>(
            r#"SELECT * FROM assignment_submissions WHERE id = $1"#,
        )
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Submission not found".to_string()))?;

        let assignment = self.get_assignment(submission.assignment_id).await?;
        let course_id = self.progress.course_for_video(assignment.video_id).await?;
        self.progress.ensure_coach_owns(coach_id, course_id).await?;

        if let Some(previous) = submission.score {
            if is_passing(previous, assignment.max_score) {
                return Err(Error::Conflict("submission already passed".to_string()));
            }
        }
        if score < Decimal::ZERO || score > assignment.max_score {
            return Err(Error::BadRequest(format!(
                "score must be between 0 and {}",
                assignment.max_score
            )));
        }

        // A stored pass is never overwritten, even by a concurrent grade.
        let updated = sqlx::query(
            r#"
            UPDATE assignment_submissions
            SET score = $2, graded_by = $3, graded_at = NOW()
            WHERE id = $1
              AND (score IS NULL OR score / $4 < 0.70)
            "#,
        )
        .bind(submission_id)
        .bind(score)
        .bind(coach_id)
        .bind(assignment.max_score)
        .execute(&self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(Error::Conflict("submission already passed".to_string()));
        }

        let passed = is_passing(score, assignment.max_score);
        tracing::info!(%coach_id, %submission_id, %score, passed, "submission graded");

        self.progress
            .after_video_event(submission.student_id, course_id, assignment.video_id)
            .await;

        Ok(GradeSubmissionResponse {
            submission_id,
            score,
            max_score: assignment.max_score,
            passed,
        })
    }
}
