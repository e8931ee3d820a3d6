/// Request authentication for axum handlers
///
/// The API layer wraps protected routes in a middleware that calls
/// [`authenticate`] with the request headers and, on success, inserts an
/// [`AuthContext`] into the request extensions. Handlers receive the
/// caller's identity as an explicit value and pass it on as a plain
/// argument; no ambient security context exists below this point.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use courseloft_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("caller: {}", auth.user_id)
/// }
/// ```
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// Authenticated caller identity
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header on the request
    #[error("missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("invalid authorization header format")]
    InvalidFormat,

    /// Token failed validation
    #[error("invalid token: {0}")]
    InvalidToken(#[from] JwtError),
}

/// Authenticates a request from its headers
///
/// Expects `Authorization: Bearer <jwt>` carrying a valid access token.
pub fn authenticate(headers: &HeaderMap, jwt_secret: &str) -> Result<AuthContext, AuthError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;

    let claims = validate_access_token(token, jwt_secret)?;
    Ok(AuthContext {
        user_id: claims.sub,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims, TokenType};
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_bearer_token_authenticates() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id, TokenType::Access), SECRET).unwrap();

        let ctx = authenticate(&headers_with(&format!("Bearer {token}")), SECRET).unwrap();
        assert_eq!(ctx.user_id, user_id);
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let err = authenticate(&HeaderMap::new(), SECRET).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[test]
    fn test_non_bearer_scheme_is_rejected() {
        let err = authenticate(&headers_with("Basic dXNlcjpwYXNz"), SECRET).unwrap_err();
        assert!(matches!(err, AuthError::InvalidFormat));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let err = authenticate(&headers_with("Bearer not.a.jwt"), SECRET).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }
}
