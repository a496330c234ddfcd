use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::progress_dto::SubmitAnswerResponse;
use crate::error::{Error, Result};
use crate::models::question::{PublicQuestion, VerificationAnswer, VerificationQuestion};
use crate::services::progress_service::ProgressService;

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
    progress: ProgressService,
}

impl QuizService {
    pub fn new(pool: PgPool, progress: ProgressService) -> Self {
        Self { pool, progress }
    }

    pub async fn get_question(&self, question_id: Uuid) -> Result<VerificationQuestion> {
        let question = sqlx::query_as::<_, VerificationQuestion>(
            r#"SELECT * FROM video_verification_questions WHERE id = $1"#,
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;
        question.ok_or_else(|| Error::NotFound("Question not found".to_string()))
    }

    pub async fn questions_for_video(&self, video_id: Uuid) -> Result<Vec<VerificationQuestion>> {
        let questions = sqlx::query_as::<_, VerificationQuestion>(
            r#"SELECT * FROM video_verification_questions WHERE video_id = $1 ORDER BY created_at ASC"#,
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    /// Questions of an unlocked video, stripped of their correct option.
    pub async fn list_questions(&self, student_id: Uuid, video_id: Uuid) -> Result<Vec<PublicQuestion>> {
        self.progress.ensure_video_unlocked(student_id, video_id).await?;
        let questions = self.questions_for_video(video_id).await?;

        let answers = sqlx::query_as::<_, VerificationAnswer>(
            r#"
            SELECT a.* FROM student_verification_answers a
            JOIN video_verification_questions q ON q.id = a.question_id
            WHERE a.student_id = $1 AND q.video_id = $2
            "#,
        )
        .bind(student_id)
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions
            .into_iter()
            .map(|q| {
                let answer = answers.iter().find(|a| a.question_id == q.id);
                PublicQuestion {
                    id: q.id,
                    video_id: q.video_id,
                    options: q.options().iter().map(|o| o.to_string()).collect(),
                    question: q.question,
                    answered: answer.is_some(),
                    answered_correctly: answer.map(|a| a.is_correct).unwrap_or(false),
                }
            })
            .collect())
    }

    /// Stores the student's answer. A question answered correctly once stays
    /// correct, so resubmitting can never take a passed quiz away.
    pub async fn submit_answer(
        &self,
        student_id: Uuid,
        question_id: Uuid,
        selected_option: &str,
    ) -> Result<SubmitAnswerResponse> {
        let question = self.get_question(question_id).await?;
        let course_id = self
            .progress
            .ensure_video_unlocked(student_id, question.video_id)
            .await?;

        if !question.options().contains(&selected_option) {
            return Err(Error::BadRequest(
                "selected_option is not one of the question's options".to_string(),
            ));
        }
        let is_correct = question.is_correct(selected_option);

        sqlx::query(
            r#"
            INSERT INTO student_verification_answers (student_id, question_id, selected_option, is_correct)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, question_id) DO UPDATE SET
                selected_option = CASE WHEN student_verification_answers.is_correct
                    THEN student_verification_answers.selected_option
                    ELSE EXCLUDED.selected_option END,
                is_correct = student_verification_answers.is_correct OR EXCLUDED.is_correct,
                answered_at = NOW()
            "#,
        )
        .bind(student_id)
        .bind(question_id)
        .bind(selected_option)
        .bind(is_correct)
        .execute(&self.pool)
        .await?;

        tracing::info!(%student_id, %question_id, is_correct, "verification answer recorded");

        self.progress
            .after_video_event(student_id, course_id, question.video_id)
            .await;

        let state = self.progress.course_state(student_id, course_id).await?;
        let quiz_complete = state
            .video(question.video_id)
            .map(|(_, v)| v.quiz_complete)
            .unwrap_or(false);

        Ok(SubmitAnswerResponse {
            question_id,
            video_id: question.video_id,
            is_correct,
            quiz_complete,
        })
    }
}
