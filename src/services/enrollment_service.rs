use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::course::Course;
use crate::models::progress::Enrollment;
use crate::models::user::StudentSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    Enrolled,
    AlreadyEnrolled,
}

#[derive(Clone)]
pub struct EnrollmentService {
    pool: PgPool,
}

impl EnrollmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enrolls the student and subscribes them to every module of the course.
    /// Enrolling twice is not an error.
    pub async fn enroll(&self, student_id: Uuid, course_id: Uuid) -> Result<EnrollOutcome> {
        let inserted = sqlx::query(
            r#"INSERT INTO enrollments (student_id, course_id) VALUES ($1, $2)"#,
        )
        .bind(student_id)
        .bind(course_id)
        .execute(&self.pool)
        .await
        .map_err(Error::from);

        let outcome = match inserted {
            Ok(_) => EnrollOutcome::Enrolled,
            Err(e) if e.is_unique_violation() => {
                tracing::info!(%student_id, %course_id, "duplicate enrollment ignored");
                EnrollOutcome::AlreadyEnrolled
            }
            Err(e) => return Err(e),
        };

        let subscribed = sqlx::query(
            r#"
            INSERT INTO module_subscriptions (student_id, module_id)
            SELECT $1, m.id FROM modules m WHERE m.course_id = $2
            ON CONFLICT (student_id, module_id) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            %student_id,
            %course_id,
            new_module_subscriptions = subscribed.rows_affected(),
            "enrollment processed"
        );
        Ok(outcome)
    }

    pub async fn get_enrollment(&self, student_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>> {
        let row = sqlx::query_as::<_, Enrollment>(
            r#"SELECT * FROM enrollments WHERE student_id = $1 AND course_id = $2"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn require_enrollment(&self, student_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
        self.get_enrollment(student_id, course_id)
            .await?
            .ok_or_else(|| Error::Forbidden("not_enrolled".to_string()))
    }

    pub async fn enrolled_courses(&self, student_id: Uuid) -> Result<Vec<(Course, Enrollment)>> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            r#"SELECT * FROM enrollments WHERE student_id = $1 ORDER BY enrolled_at DESC"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let course = sqlx::query_as::<_, Course>(r#"SELECT * FROM courses WHERE id = $1"#)
                .bind(enrollment.course_id)
                .fetch_one(&self.pool)
                .await?;
            out.push((course, enrollment));
        }
        Ok(out)
    }

    pub async fn enrolled_students(&self, course_id: Uuid) -> Result<Vec<StudentSummary>> {
        let students = sqlx::query_as::<_, StudentSummary>(
            r#"
            SELECT s.id, s.name, s.email
            FROM enrollments e
            JOIN students s ON s.id = e.student_id
            WHERE e.course_id = $1
            ORDER BY s.name ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    /// Stamps the course as completed once; later calls keep the first time.
    pub async fn mark_course_completed(&self, student_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
        let row = sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments
            SET completed_at = COALESCE(completed_at, NOW())
            WHERE student_id = $1 AND course_id = $2
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| Error::Forbidden("not_enrolled".to_string()))
    }
}
