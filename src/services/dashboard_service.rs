use uuid::Uuid;

use crate::dto::course_dto::{DashboardCourse, ProgressSummary, StudentProgressRow};
use crate::error::Result;
use crate::services::catalog_service::CatalogService;
use crate::services::enrollment_service::EnrollmentService;
use crate::services::progress_service::ProgressService;

#[derive(Clone)]
pub struct DashboardService {
    progress: ProgressService,
    catalog: CatalogService,
    enrollments: EnrollmentService,
}

impl DashboardService {
    pub fn new(
        progress: ProgressService,
        catalog: CatalogService,
        enrollments: EnrollmentService,
    ) -> Self {
        Self {
            progress,
            catalog,
            enrollments,
        }
    }

    pub async fn student_dashboard(&self, student_id: Uuid) -> Result<Vec<DashboardCourse>> {
        let enrolled = self.enrollments.enrolled_courses(student_id).await?;
        let mut out = Vec::with_capacity(enrolled.len());
        for (course, enrollment) in enrolled {
            let tree = self.catalog.load_tree(course.id).await?;
            let state = self.progress.evaluate(student_id, &tree).await?;
            out.push(DashboardCourse {
                course_id: course.id,
                title: course.title,
                enrolled_at: enrollment.enrolled_at,
                completed_at: enrollment.completed_at,
                progress: ProgressSummary::from(&state),
            });
        }
        Ok(out)
    }

    /// Progress of every enrolled student; the course tree is loaded once.
    pub async fn course_students(&self, coach_id: Uuid, course_id: Uuid) -> Result<Vec<StudentProgressRow>> {
        self.progress.ensure_coach_owns(coach_id, course_id).await?;
        let tree = self.catalog.load_tree(course_id).await?;
        let students = self.enrollments.enrolled_students(course_id).await?;

        let mut rows = Vec::with_capacity(students.len());
        for student in students {
            let state = self.progress.evaluate(student.id, &tree).await?;
            rows.push(StudentProgressRow {
                student_id: student.id,
                name: student.name,
                email: student.email,
                progress: ProgressSummary::from(&state),
            });
        }
        Ok(rows)
    }
}
