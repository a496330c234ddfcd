use std::env;

use learning_backend::error::Error;
use learning_backend::utils::crypto::hash_pin;
use learning_backend::AppState;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

struct Fixture {
    state: AppState,
    student_id: Uuid,
    coach_id: Uuid,
    course_id: Uuid,
    video_id: Uuid,
    question_id: Uuid,
    assignment_id: Uuid,
}

async fn setup() -> Fixture {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    let _ = learning_backend::config::init_config();

    let pool = learning_backend::database::pool::create_pool()
        .await
        .expect("pool");
    learning_backend::database::pool::run_migrations(&pool)
        .await
        .expect("migrations");

    let tag = Uuid::new_v4();
    let pin_hash = hash_pin("4821").expect("hash");

    let (coach_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO coaches (name, email, pin_hash) VALUES ('Coach', $1, $2) RETURNING id",
    )
    .bind(format!("coach_{}@example.com", tag))
    .bind(&pin_hash)
    .fetch_one(&pool)
    .await
    .expect("seed coach");

    let (student_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO students (name, email, pin_hash) VALUES ('Student', $1, $2) RETURNING id",
    )
    .bind(format!("student_{}@example.com", tag))
    .bind(&pin_hash)
    .fetch_one(&pool)
    .await
    .expect("seed student");

    let (course_id,): (Uuid,) =
        sqlx::query_as("INSERT INTO courses (title, coach_id) VALUES ('Finality', $1) RETURNING id")
            .bind(coach_id)
            .fetch_one(&pool)
            .await
            .expect("seed course");

    let (module_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO modules (course_id, title, order_index) VALUES ($1, 'Only', 0) RETURNING id",
    )
    .bind(course_id)
    .fetch_one(&pool)
    .await
    .expect("seed module");

    let (video_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO videos (title, url) VALUES ('Intro', 'https://cdn.example.com/intro.mp4') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .expect("seed video");

    sqlx::query("INSERT INTO module_videos (module_id, video_id, order_index) VALUES ($1, $2, 0)")
        .bind(module_id)
        .bind(video_id)
        .execute(&pool)
        .await
        .expect("link video");

    let (question_id,): (Uuid,) = sqlx::query_as(
        r#"INSERT INTO video_verification_questions
           (video_id, question, option_a, option_b, option_c, option_d, correct_option)
           VALUES ($1, 'Pick B', 'A', 'B', 'C', 'D', 'B')
           RETURNING id"#,
    )
    .bind(video_id)
    .fetch_one(&pool)
    .await
    .expect("seed question");

    let (assignment_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO assignments (video_id, title, max_score) VALUES ($1, 'Essay', 10) RETURNING id",
    )
    .bind(video_id)
    .fetch_one(&pool)
    .await
    .expect("seed assignment");

    let state = AppState::new(pool);
    state
        .enrollment_service
        .enroll(student_id, course_id)
        .await
        .expect("enroll");

    Fixture {
        state,
        student_id,
        coach_id,
        course_id,
        video_id,
        question_id,
        assignment_id,
    }
}

async fn stored_score(pool: &PgPool, submission_id: Uuid) -> Option<Decimal> {
    sqlx::query_scalar("SELECT score FROM assignment_submissions WHERE id = $1")
        .bind(submission_id)
        .fetch_one(pool)
        .await
        .expect("score")
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
async fn concurrent_grades_never_revoke_a_pass() {
    let f = setup().await;
    let submission = f
        .state
        .assignment_service
        .submit(f.student_id, f.assignment_id, "draft")
        .await
        .expect("submit");
    let assignments = &f.state.assignment_service;
    let pass = Decimal::new(8, 0);
    let fail = Decimal::new(6, 0);

    for _ in 0..40 {
        sqlx::query("UPDATE assignment_submissions SET score = NULL, graded_at = NULL WHERE id = $1")
            .bind(submission.id)
            .execute(&f.state.pool)
            .await
            .expect("reset");

        let (passing, failing) = tokio::join!(
            assignments.grade(f.coach_id, submission.id, pass),
            assignments.grade(f.coach_id, submission.id, fail),
        );
        let score = stored_score(&f.state.pool, submission.id).await;

        match passing {
            Ok(graded) => {
                assert!(graded.passed);
                assert_eq!(score, Some(pass));
            }
            Err(e) => panic!("passing grade rejected: {:?}", e),
        }
        if let Err(e) = failing {
            assert!(matches!(e, Error::Conflict(_)), "unexpected error: {:?}", e);
        }
    }

    let err = assignments
        .grade(f.coach_id, submission.id, fail)
        .await
        .expect_err("regrade after pass");
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(stored_score(&f.state.pool, submission.id).await, Some(pass));

    let state = f
        .state
        .progress_service
        .course_state(f.student_id, f.course_id)
        .await
        .expect("state");
    let (_, video) = state.video(f.video_id).expect("video");
    assert!(video.assignment_complete);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
async fn concurrent_answers_converge_on_one_correct_row() {
    let f = setup().await;
    let quiz = &f.state.quiz_service;

    let (first, second) = tokio::join!(
        quiz.submit_answer(f.student_id, f.question_id, "B"),
        quiz.submit_answer(f.student_id, f.question_id, "B"),
    );
    assert!(first.expect("first answer").is_correct);
    assert!(second.expect("second answer").is_correct);

    let (right, wrong) = tokio::join!(
        quiz.submit_answer(f.student_id, f.question_id, "B"),
        quiz.submit_answer(f.student_id, f.question_id, "C"),
    );
    assert!(right.expect("right answer").quiz_complete);
    assert!(wrong.expect("wrong answer").quiz_complete);

    let rows: Vec<(bool, String)> = sqlx::query_as(
        "SELECT is_correct, selected_option FROM student_verification_answers WHERE student_id = $1 AND question_id = $2",
    )
    .bind(f.student_id)
    .bind(f.question_id)
    .fetch_all(&f.state.pool)
    .await
    .expect("answers");
    assert_eq!(rows, vec![(true, "B".to_string())]);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
async fn video_cannot_be_placed_in_two_modules() {
    let f = setup().await;

    let (other_course,): (Uuid,) =
        sqlx::query_as("INSERT INTO courses (title) VALUES ('Other') RETURNING id")
            .fetch_one(&f.state.pool)
            .await
            .expect("seed course");
    let (other_module,): (Uuid,) = sqlx::query_as(
        "INSERT INTO modules (course_id, title, order_index) VALUES ($1, 'Elsewhere', 0) RETURNING id",
    )
    .bind(other_course)
    .fetch_one(&f.state.pool)
    .await
    .expect("seed module");

    let err = sqlx::query(
        "INSERT INTO module_videos (module_id, video_id, order_index) VALUES ($1, $2, 0)",
    )
    .bind(other_module)
    .bind(f.video_id)
    .execute(&f.state.pool)
    .await
    .expect_err("second placement");
    assert!(Error::from(err).is_unique_violation());

    let resolved = f
        .state
        .catalog_service
        .course_for_video(f.video_id)
        .await
        .expect("course");
    assert_eq!(resolved, f.course_id);
    f.state
        .progress_service
        .ensure_video_unlocked(f.student_id, f.video_id)
        .await
        .expect("playable in its own course");
}
