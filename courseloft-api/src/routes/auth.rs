/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new account
/// - `POST /auth/login` - Login and receive tokens
/// - `POST /auth/refresh` - Exchange a refresh token for a new access token
use crate::app::AppState;
use crate::error::{validation_error, ApiError, ApiResult};
use crate::response::TokenEnvelope;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use courseloft_shared::auth::jwt::{self, Claims, JwtError, TokenType};
use courseloft_shared::auth::password;
use courseloft_shared::models::CreateUser;
use courseloft_shared::store::StoreError;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked for strength beyond the length floor
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

fn issue_tokens(user_id: Uuid, secret: &str) -> Result<(String, String), ApiError> {
    let access = jwt::create_token(&Claims::new(user_id, TokenType::Access), secret)?;
    let refresh = jwt::create_token(&Claims::new(user_id, TokenType::Refresh), secret)?;
    Ok((access, refresh))
}

/// Registers a new user
///
/// # Errors
///
/// - `400 Bad Request`: validation or weak password
/// - `409 Conflict`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<TokenEnvelope> {
    req.validate().map_err(validation_error)?;
    password::validate_password_strength(&req.password)?;

    let password_hash = password::hash_password(&req.password)?;
    let user = state
        .stores
        .users
        .create(CreateUser {
            email: req.email.trim().to_lowercase(),
            password_hash,
            name: req.name,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => ApiError::Conflict("email already registered".to_string()),
            other => other.into(),
        })?;

    let (access_token, refresh_token) = issue_tokens(user.id, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(TokenEnvelope {
        message: "user registered".to_string(),
        status: StatusCode::CREATED.as_u16(),
        user_id: user.id,
        access_token,
        refresh_token: Some(refresh_token),
    })
}

/// Logs a user in
///
/// # Errors
///
/// `401 Unauthorized` on unknown email or wrong password; the two cases
/// share one message.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<TokenEnvelope> {
    req.validate().map_err(validation_error)?;

    let credentials_rejected = || ApiError::Unauthorized("invalid email or password".to_string());

    let user = state
        .stores
        .users
        .find_by_email(&req.email.trim().to_lowercase())
        .await?
        .ok_or_else(credentials_rejected)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(credentials_rejected());
    }

    state.stores.users.update_last_login(user.id).await?;
    let (access_token, refresh_token) = issue_tokens(user.id, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(TokenEnvelope {
        message: "login successful".to_string(),
        status: StatusCode::OK.as_u16(),
        user_id: user.id,
        access_token,
        refresh_token: Some(refresh_token),
    })
}

/// Exchanges a refresh token for a fresh access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<TokenEnvelope> {
    let claims = jwt::validate_token(&req.refresh_token, state.jwt_secret())?;
    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::WrongTokenType { expected: "refresh" }.into());
    }
    let access_token = jwt::create_token(&Claims::new(claims.sub, TokenType::Access), state.jwt_secret())?;

    Ok(TokenEnvelope {
        message: "token refreshed".to_string(),
        status: StatusCode::OK.as_u16(),
        user_id: claims.sub,
        access_token,
        refresh_token: None,
    })
}
