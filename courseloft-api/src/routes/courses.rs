/// Course and content authoring endpoints
///
/// # Endpoints
///
/// - `POST /courses` - Create a course
/// - `GET /courses/:course_id` - Fetch a course
/// - `POST /courses/:course_id/content` - Attach a content item (owner only)
/// - `GET /courses/:course_id/content` - List a course's content
use crate::app::AppState;
use crate::error::{validation_error, ApiResult};
use crate::response::Payload;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use courseloft_shared::auth::middleware::AuthContext;
use courseloft_shared::catalog::ContentDraft;
use courseloft_shared::models::{Course, CourseContent};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Course creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Capacity bound; must be at least 1
    #[validate(range(min = 1, message = "Maximum attendees must be at least 1"))]
    pub maximum_attendees: i32,
}

/// Content creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContentRequest {
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: String,

    /// Reference into the video storage backend; delivery is out of scope
    #[validate(length(min = 1, message = "Video reference is required"))]
    pub video_ref: String,

    /// Publication date; today publishes immediately, the past is rejected
    pub release_date: NaiveDate,

    #[validate(length(min = 1, max = 200, message = "Module must be 1-200 characters"))]
    pub course_module: String,
}

/// Creates a course owned by the caller
pub async fn create_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCourseRequest>,
) -> ApiResult<Payload<Course>> {
    req.validate().map_err(validation_error)?;

    let course = state
        .catalog
        .create_course(auth.user_id, req.title, req.maximum_attendees)
        .await?;

    Ok(Payload::new(StatusCode::CREATED, "course created", course))
}

/// Fetches a course by ID
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Payload<Course>> {
    let course = state.catalog.get_course(course_id).await?;
    Ok(Payload::new(StatusCode::OK, "course found", course))
}

/// Attaches a content item to a course the caller owns
///
/// # Errors
///
/// - `403 Forbidden`: caller does not own the course
/// - `400 Bad Request`: release date in the past
pub async fn create_content(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<CreateContentRequest>,
) -> ApiResult<Payload<CourseContent>> {
    req.validate().map_err(validation_error)?;

    let content = state
        .catalog
        .create_content(
            auth.user_id,
            course_id,
            ContentDraft {
                description: req.description,
                video_ref: req.video_ref,
                release_date: req.release_date,
                course_module: req.course_module,
            },
        )
        .await?;

    Ok(Payload::new(StatusCode::CREATED, "content created", content))
}

/// Lists a course's content, oldest release first
pub async fn list_content(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Payload<Vec<CourseContent>>> {
    let content = state.catalog.list_content(course_id).await?;
    Ok(Payload::new(StatusCode::OK, "course content", content))
}
