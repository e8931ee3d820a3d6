//! Database models
//!
//! Each model is a plain struct deriving `sqlx::FromRow` together with the
//! async query functions that operate on it. The query functions take a
//! `PgPool` explicitly; the trait-based store layer in [`crate::store`]
//! wraps them for callers that need an injectable boundary.

pub mod content;
pub mod course;
pub mod membership;
pub mod reset_token;
pub mod user;

pub use content::{ContentStatus, CourseContent, NewCourseContent};
pub use course::{Course, CreateCourse};
pub use membership::{Membership, NewMembership};
pub use reset_token::{NewResetToken, PasswordResetToken};
pub use user::{CreateUser, User};
