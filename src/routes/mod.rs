pub mod auth;
pub mod coach;
pub mod courses;
pub mod health;
pub mod notifications;
pub mod progress;
pub mod quiz;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::auth::{require_coach, require_student};
use crate::AppState;

/// Full HTTP surface. Student and coach groups sit behind their own role
/// guard; everything else is public.
pub fn app(state: AppState) -> Router {
    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready));

    let public_api = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/courses", get(courses::list_courses))
        .route("/api/courses/:id", get(courses::get_course));

    let student_api = Router::new()
        .route("/api/courses/:id/enroll", post(courses::enroll))
        .route("/api/courses/:id/state", get(courses::course_state))
        .route("/api/me/dashboard", get(progress::dashboard))
        .route("/api/videos/:id/progress", post(progress::record_watch))
        .route("/api/videos/:id/questions", get(quiz::list_questions))
        .route("/api/questions/:id/answer", post(quiz::submit_answer))
        .route("/api/completions", post(progress::complete))
        .route(
            "/api/assignments/:id/submission",
            post(quiz::submit_assignment),
        )
        .route(
            "/api/notifications",
            get(notifications::list_notifications),
        )
        .route(
            "/api/notifications/:id/read",
            post(notifications::mark_read),
        )
        .layer(axum::middleware::from_fn(require_student));

    let coach_api = Router::new()
        .route(
            "/api/coach/courses/:id/students",
            get(coach::course_students),
        )
        .route(
            "/api/coach/submissions/:id/grade",
            post(coach::grade_submission),
        )
        .layer(axum::middleware::from_fn(require_coach));

    base_routes
        .merge(public_api)
        .merge(student_api)
        .merge(coach_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}
