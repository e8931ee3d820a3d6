/// API route handlers
///
/// - `health`: liveness and database status
/// - `auth`: registration, login, token refresh
/// - `courses`: course and content authoring
/// - `enrollment`: joining and leaving courses
/// - `reset_password`: password-reset token flow

pub mod auth;
pub mod courses;
pub mod enrollment;
pub mod health;
pub mod reset_password;
