/// Error handling for the API server
///
/// One unified error type that maps onto HTTP responses. Handlers return
/// `ApiResult<T>`; service-layer errors convert via `From` so the domain
/// crate never knows about status codes.
///
/// Every error renders as the standard envelope:
///
/// ```json
/// { "message": "no available spots in this course", "status": 409 }
/// ```
///
/// Internal failures are logged with their detail and surface as an opaque
/// 500.
use crate::response::Envelope;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use courseloft_shared::admission::AdmissionError;
use courseloft_shared::auth::jwt::JwtError;
use courseloft_shared::auth::middleware::AuthError;
use courseloft_shared::auth::password::PasswordError;
use courseloft_shared::catalog::CatalogError;
use courseloft_shared::recovery::RecoveryError;
use courseloft_shared::store::StoreError;
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409)
    Conflict(String),

    /// Gone (410) - expired reset token
    Gone(String),

    /// Validation failure (400), one message per failing field
    Validation(Vec<String>),

    /// Internal server error (500); the detail is logged, not returned
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Gone(_) => StatusCode::GONE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Gone(msg)
            | ApiError::Internal(msg) => write!(f, "{}", msg),
            ApiError::Validation(errors) => write!(f, "{}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal server error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        Envelope::new(status, message).into_response()
    }
}

/// Collects `validator` failures into one `Validation` error
pub fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: invalid value", field),
            })
        })
        .collect();
    messages.sort();
    ApiError::Validation(messages)
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(constraint) => {
                ApiError::Conflict(format!("duplicate record: {constraint}"))
            }
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::CourseNotFound | AdmissionError::MembershipNotFound => {
                ApiError::NotFound(err.to_string())
            }
            AdmissionError::OwnerEnrollment => ApiError::Forbidden(err.to_string()),
            AdmissionError::NoAvailableSpots | AdmissionError::AlreadyEnrolled => {
                ApiError::Conflict(err.to_string())
            }
            AdmissionError::Store(store) => store.into(),
        }
    }
}

impl From<RecoveryError> for ApiError {
    fn from(err: RecoveryError) -> Self {
        match err {
            RecoveryError::UserNotFound | RecoveryError::TokenNotFound => {
                ApiError::NotFound(err.to_string())
            }
            RecoveryError::TokenExpired => ApiError::Gone(err.to_string()),
            RecoveryError::Hash(hash) => hash.into(),
            RecoveryError::Store(store) => store.into(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::CourseNotFound => ApiError::NotFound(err.to_string()),
            CatalogError::NotCourseOwner => ApiError::Forbidden(err.to_string()),
            CatalogError::InvalidCapacity | CatalogError::InvalidReleaseDate => {
                ApiError::BadRequest(err.to_string())
            }
            CatalogError::Store(store) => store.into(),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooWeak(rule) => ApiError::BadRequest(rule.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_enrollment_maps_to_forbidden() {
        let api: ApiError = AdmissionError::OwnerEnrollment.into();
        assert_eq!(api.status(), StatusCode::FORBIDDEN);
        assert_eq!(api.to_string(), "task not allowed");
    }

    #[test]
    fn test_full_course_maps_to_conflict() {
        let api: ApiError = AdmissionError::NoAvailableSpots.into();
        assert_eq!(api.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_expired_reset_token_maps_to_gone() {
        let api: ApiError = RecoveryError::TokenExpired.into();
        assert_eq!(api.status(), StatusCode::GONE);
    }

    #[test]
    fn test_weak_password_maps_to_bad_request() {
        let api: ApiError = PasswordError::TooWeak("Password must contain a digit").into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api.to_string(), "Password must contain a digit");
    }

    #[test]
    fn test_backend_detail_is_not_leaked() {
        let api: ApiError = StoreError::Backend("connection refused at 10.0.0.3".to_string()).into();
        let response = api.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_collects_fields() {
        let mut errors = validator::ValidationErrors::new();
        let mut field = validator::ValidationError::new("email");
        field.message = Some("Invalid email format".into());
        errors.add("email", field);
        let api = validation_error(errors);
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert!(api.to_string().contains("email"));
    }
}
