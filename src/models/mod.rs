pub mod assignment;
pub mod course;
pub mod notification;
pub mod progress;
pub mod question;
pub mod user;
