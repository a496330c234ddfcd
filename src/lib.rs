pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    assignment_service::AssignmentService, auth_service::AuthService,
    catalog_service::CatalogService, completion_service::CompletionService,
    dashboard_service::DashboardService, enrollment_service::EnrollmentService,
    evaluator::Evaluator, notification_service::NotificationService,
    progress_service::ProgressService, quiz_service::QuizService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub enrollment_service: EnrollmentService,
    pub progress_service: ProgressService,
    pub quiz_service: QuizService,
    pub assignment_service: AssignmentService,
    pub completion_service: CompletionService,
    pub notification_service: NotificationService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self::with_evaluator(pool, Evaluator::from_config())
    }

    pub fn with_evaluator(pool: PgPool, evaluator: Evaluator) -> Self {
        let auth_service = AuthService::new(pool.clone());
        let catalog_service = CatalogService::new(pool.clone());
        let enrollment_service = EnrollmentService::new(pool.clone());
        let notification_service = NotificationService::new(pool.clone());
        let progress_service = ProgressService::new(pool.clone(), evaluator);
        let quiz_service = QuizService::new(pool.clone(), progress_service.clone());
        let assignment_service = AssignmentService::new(pool.clone(), progress_service.clone());
        let completion_service = CompletionService::new(
            progress_service.clone(),
            catalog_service.clone(),
            enrollment_service.clone(),
            notification_service.clone(),
        );
        let dashboard_service = DashboardService::new(
            progress_service.clone(),
            catalog_service.clone(),
            enrollment_service.clone(),
        );

        Self {
            pool,
            auth_service,
            catalog_service,
            enrollment_service,
            progress_service,
            quiz_service,
            assignment_service,
            completion_service,
            notification_service,
            dashboard_service,
        }
    }
}
