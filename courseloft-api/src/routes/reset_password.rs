/// Password-reset endpoints
///
/// # Endpoints
///
/// - `POST /reset-password/send-email` - Issue (or resend) a reset token
/// - `PUT /reset-password` - Consume a token and set a new password
use crate::app::AppState;
use crate::error::{validation_error, ApiResult};
use crate::response::Envelope;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use courseloft_shared::auth::password;
use courseloft_shared::recovery::ResetRequestOutcome;
use serde::Deserialize;
use validator::Validate;

/// Reset request by email
#[derive(Debug, Deserialize, Validate)]
pub struct SendEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Token consumption request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequest {
    /// Opaque token from the reset email
    #[validate(length(equal = 64, message = "Invalid token format"))]
    pub token: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Issues a reset token and mails it
///
/// Returns `201` when a fresh token was issued and `200` when an active
/// token was resent unchanged.
///
/// # Errors
///
/// `404 Not Found` when no account matches the email.
pub async fn send_email(
    State(state): State<AppState>,
    Json(req): Json<SendEmailRequest>,
) -> ApiResult<Envelope> {
    req.validate().map_err(validation_error)?;

    let outcome = state
        .recovery
        .request_reset(&req.email.trim().to_lowercase())
        .await?;

    let envelope = match outcome {
        ResetRequestOutcome::Issued => {
            Envelope::new(StatusCode::CREATED, "password reset email sent")
        }
        ResetRequestOutcome::Resent => {
            Envelope::new(StatusCode::OK, "password reset email resent")
        }
    };
    Ok(envelope)
}

/// Consumes a reset token and installs the new password
///
/// # Errors
///
/// - `404 Not Found`: unknown or already consumed token
/// - `410 Gone`: token past its TTL; request a new one
/// - `400 Bad Request`: weak replacement password
pub async fn reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<Envelope> {
    req.validate().map_err(validation_error)?;
    password::validate_password_strength(&req.password)?;

    state.recovery.reset_password(&req.token, &req.password).await?;
    Ok(Envelope::new(StatusCode::OK, "password updated successfully"))
}
