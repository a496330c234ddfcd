pub mod assignment_service;
pub mod auth_service;
pub mod catalog_service;
pub mod completion_service;
pub mod dashboard_service;
pub mod enrollment_service;
pub mod evaluator;
pub mod notification_service;
pub mod progress_service;
pub mod quiz_service;
