/// Uniform response envelope
///
/// Every response body carries `message` and `status` (the HTTP status
/// code, repeated in the body). Endpoints that return data or tokens use
/// the extended variants, which keep the same two base fields.
///
/// ```json
/// { "message": "user enrolled successfully", "status": 201 }
/// ```
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Plain message envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub message: String,
    pub status: u16,
}

impl Envelope {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: status.as_u16(),
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let code = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (code, Json(self)).into_response()
    }
}

/// Envelope carrying a data payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Payload<T> {
    pub message: String,
    pub status: u16,
    pub data: T,
}

impl<T: Serialize> Payload<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            status: status.as_u16(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Payload<T> {
    fn into_response(self) -> Response {
        let code = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (code, Json(self)).into_response()
    }
}

/// Envelope for authentication endpoints, carrying issued tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenEnvelope {
    pub message: String,
    pub status: u16,
    pub user_id: Uuid,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl IntoResponse for TokenEnvelope {
    fn into_response(self) -> Response {
        let code = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_repeats_status_in_body() {
        let envelope = Envelope::new(StatusCode::CREATED, "user enrolled successfully");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], 201);
        assert_eq!(json["message"], "user enrolled successfully");
    }

    #[test]
    fn test_token_envelope_omits_absent_refresh_token() {
        let envelope = TokenEnvelope {
            message: "token refreshed".to_string(),
            status: 200,
            user_id: Uuid::new_v4(),
            access_token: "eyJ".to_string(),
            refresh_token: None,
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("refresh_token").is_none());
    }
}
