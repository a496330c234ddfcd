use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::course_dto::{CourseDetail, ModuleDetail, VideoDetail};
use crate::error::{Error, Result};
use crate::models::assignment::Assignment;
use crate::models::course::{Course, Module, ModuleVideo};
use crate::services::evaluator::CourseTree;

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"SELECT * FROM courses WHERE is_published = TRUE ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    pub async fn get_course(&self, course_id: Uuid) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(r#"SELECT * FROM courses WHERE id = $1"#)
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;
        course.ok_or_else(|| Error::NotFound("Course not found".to_string()))
    }

    pub async fn modules(&self, course_id: Uuid) -> Result<Vec<Module>> {
        let modules = sqlx::query_as::<_, Module>(
            r#"SELECT * FROM modules WHERE course_id = $1 ORDER BY order_index ASC"#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(modules)
    }

    pub async fn module_videos(&self, course_id: Uuid) -> Result<Vec<ModuleVideo>> {
        let videos = sqlx::query_as::<_, ModuleVideo>(
            r#"
            SELECT v.id, mv.module_id, mv.order_index, v.title, v.url, v.duration_seconds
            FROM module_videos mv
            JOIN videos v ON v.id = mv.video_id
            JOIN modules m ON m.id = mv.module_id
            WHERE m.course_id = $1
            ORDER BY m.order_index ASC, mv.order_index ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(videos)
    }

    /// Loads the ordered module/video tree the evaluator gates over.
    pub async fn load_tree(&self, course_id: Uuid) -> Result<CourseTree> {
        let modules = self.modules(course_id).await?;
        let videos = self.module_videos(course_id).await?;

        let questions: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT q.video_id, q.id
            FROM video_verification_questions q
            WHERE q.video_id IN (
                SELECT mv.video_id FROM module_videos mv
                JOIN modules m ON m.id = mv.module_id
                WHERE m.course_id = $1
            )
            ORDER BY q.created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let assignments = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT a.* FROM assignments a
            WHERE a.video_id IN (
                SELECT mv.video_id FROM module_videos mv
                JOIN modules m ON m.id = mv.module_id
                WHERE m.course_id = $1
            )
            ORDER BY a.created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CourseTree::build(course_id, modules, videos, questions, assignments))
    }

    pub async fn course_detail(&self, course_id: Uuid) -> Result<CourseDetail> {
        let course = self.get_course(course_id).await?;
        let modules = self.modules(course_id).await?;
        let videos = self.module_videos(course_id).await?;

        let modules = modules
            .into_iter()
            .map(|m| ModuleDetail {
                videos: videos
                    .iter()
                    .filter(|v| v.module_id == m.id)
                    .map(|v| VideoDetail {
                        id: v.id,
                        title: v.title.clone(),
                        url: v.url.clone(),
                        duration_seconds: v.duration_seconds,
                        order_index: v.order_index,
                    })
                    .collect(),
                id: m.id,
                title: m.title,
                description: m.description,
                order_index: m.order_index,
            })
            .collect();

        Ok(CourseDetail { course, modules })
    }

    /// Course a video belongs to. `module_videos.video_id` is unique, so there
    /// is at most one.
    pub async fn course_for_video(&self, video_id: Uuid) -> Result<Uuid> {
        let course_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT m.course_id FROM module_videos mv
            JOIN modules m ON m.id = mv.module_id
            WHERE mv.video_id = $1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;
        course_id.ok_or_else(|| Error::NotFound("Video not found".to_string()))
    }

    pub async fn course_for_module(&self, module_id: Uuid) -> Result<Uuid> {
        let course_id: Option<Uuid> =
            sqlx::query_scalar(r#"SELECT course_id FROM modules WHERE id = $1"#)
                .bind(module_id)
                .fetch_optional(&self.pool)
                .await?;
        course_id.ok_or_else(|| Error::NotFound("Module not found".to_string()))
    }
}
