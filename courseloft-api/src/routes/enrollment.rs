/// Enrollment endpoints
///
/// Joining and leaving a course. The same handlers are mounted under both
/// `/enrollment` and `/subscription`; the two paths are aliases for one
/// membership concept.
///
/// # Endpoints
///
/// - `POST /enrollment/:course_id/create` - Join a course
/// - `DELETE /enrollment/:course_id/delete` - Leave a course
use crate::app::AppState;
use crate::error::ApiResult;
use crate::response::Envelope;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Extension;
use courseloft_shared::auth::middleware::AuthContext;
use uuid::Uuid;

/// Joins the caller to a course
///
/// # Errors
///
/// - `404 Not Found`: no such course
/// - `403 Forbidden`: the caller owns the course ("task not allowed")
/// - `409 Conflict`: course full, or already enrolled
pub async fn join(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Envelope> {
    state.admission.join(auth.user_id, course_id).await?;
    Ok(Envelope::new(
        StatusCode::CREATED,
        "enrolled successfully",
    ))
}

/// Removes the caller's membership in a course
///
/// # Errors
///
/// `404 Not Found` when no membership exists, including a repeated leave.
pub async fn leave(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Envelope> {
    state.admission.leave(auth.user_id, course_id).await?;
    Ok(Envelope::new(StatusCode::OK, "enrollment removed"))
}
