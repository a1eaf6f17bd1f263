// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code and error code.
/// Display strings are the user-facing (German) messages.
#[derive(Error, Debug)]
pub enum TravelError {
    #[error("Eintrag nicht gefunden: {0}")]
    NotFound(String),

    #[error("Eintrag existiert bereits: {0}")]
    AlreadyExists(String),

    #[error("Datenbankfehler: {0}")]
    DatabaseError(String),

    #[error("Ungültige Eingabe: {0}")]
    InvalidInput(String),

    #[error("Validierung fehlgeschlagen: {0}")]
    ValidationError(String),

    #[error("Nicht autorisiert")]
    Unauthorized,

    #[error("Zugriff verweigert")]
    Forbidden,

    #[error("Datei ist zu groß (maximal {0} Bytes)")]
    PayloadTooLarge(usize),

    #[error("Dateityp wird nicht unterstützt: {0}")]
    UnsupportedMediaType(String),

    #[error("Speicherfehler: {0}")]
    StorageError(String),

    #[error("Fehler beim externen Dienst: {0}")]
    ExternalApiError(String),

    #[error("Zu viele Anfragen, bitte später erneut versuchen")]
    RateLimitExceeded,

    #[error("Interner Serverfehler")]
    InternalError,
}

impl TravelError {
    fn code(&self) -> &'static str {
        match self {
            TravelError::NotFound(_) => "NOT_FOUND",
            TravelError::AlreadyExists(_) => "ALREADY_EXISTS",
            TravelError::DatabaseError(_) => "DATABASE_ERROR",
            TravelError::InvalidInput(_) => "INVALID_INPUT",
            TravelError::ValidationError(_) => "VALIDATION_ERROR",
            TravelError::Unauthorized => "UNAUTHORIZED",
            TravelError::Forbidden => "FORBIDDEN",
            TravelError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            TravelError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            TravelError::StorageError(_) => "STORAGE_ERROR",
            TravelError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            TravelError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            TravelError::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for TravelError {
    fn from(errors: validator::ValidationErrors) -> Self {
        TravelError::ValidationError(errors.to_string())
    }
}

/// Convert TravelError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for TravelError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            TravelError::NotFound(_) => StatusCode::NOT_FOUND,
            TravelError::AlreadyExists(_) => StatusCode::CONFLICT,
            TravelError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TravelError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TravelError::ValidationError(_) => StatusCode::BAD_REQUEST,
            TravelError::Unauthorized => StatusCode::UNAUTHORIZED,
            TravelError::Forbidden => StatusCode::FORBIDDEN,
            TravelError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            TravelError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            TravelError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TravelError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            TravelError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            TravelError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            TravelError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TravelError::AlreadyExists("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            TravelError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            TravelError::PayloadTooLarge(10).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let resp = TravelError::InvalidInput("cursor".into()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(value["error"]["code"], "INVALID_INPUT");
        assert_eq!(value["error"]["message"], "Ungültige Eingabe: cursor");
        assert!(value["error"]["timestamp"].is_string());
    }
}
