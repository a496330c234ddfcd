use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::notification::{AchievementKind, Notification};

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records an achievement keyed by (student, kind, reference). Returns
    /// `true` only the first time.
    pub async fn award_achievement(
        &self,
        student_id: Uuid,
        kind: AchievementKind,
        reference_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO student_achievements (student_id, kind, reference_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (student_id, kind, reference_id) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(kind.as_str())
        .bind(reference_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Same natural key as achievements, so replaying an event never stacks up
    /// duplicate notifications.
    pub async fn notify(
        &self,
        student_id: Uuid,
        kind: AchievementKind,
        reference_id: Uuid,
        title: &str,
        message: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (student_id, kind, reference_id, title, message)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (student_id, kind, reference_id) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(kind.as_str())
        .bind(reference_id)
        .bind(title)
        .bind(message)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Achievement plus notification. Failures are logged and swallowed: the
    /// request that triggered them has already succeeded.
    pub async fn celebrate(
        &self,
        student_id: Uuid,
        kind: AchievementKind,
        reference_id: Uuid,
        title: &str,
        message: &str,
    ) {
        match self.award_achievement(student_id, kind, reference_id).await {
            Ok(true) => tracing::info!(%student_id, kind = kind.as_str(), %reference_id, "achievement awarded"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = ?e, %student_id, kind = kind.as_str(), "failed to record achievement"),
        }
        if let Err(e) = self.notify(student_id, kind, reference_id, title, message).await {
            tracing::warn!(error = ?e, %student_id, kind = kind.as_str(), "failed to record notification");
        }
    }

    pub async fn list_for_student(&self, student_id: Uuid, unread_only: bool) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE student_id = $1 AND ($2 = FALSE OR read_at IS NULL)
            ORDER BY created_at DESC
            "#,
        )
        .bind(student_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_read(&self, student_id: Uuid, notification_id: Uuid) -> Result<Notification> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND student_id = $2
            RETURNING *
            "#,
        )
        .bind(notification_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| Error::NotFound("Notification not found".to_string()))
    }
}
