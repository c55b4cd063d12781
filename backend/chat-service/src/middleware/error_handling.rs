use crate::error::AppError;
use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
    /// validation_error, authentication_error, not_found_error, ...
    pub error_type: String,
    pub code: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

pub fn map_error(err: &AppError) -> (StatusCode, ErrorResponse) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let (error_type, code) = match err {
        AppError::BadRequest(_) => ("validation_error", "INVALID_REQUEST"),
        AppError::Unauthorized => ("authorization_error", "UNAUTHORIZED"),
        AppError::NotFound(_) => ("not_found_error", "NOT_FOUND"),
        AppError::InvalidOperation(_) => ("validation_error", "INVALID_OPERATION"),
        AppError::Database(_) => ("server_error", "DATABASE_ERROR"),
        AppError::Dependency(_) => ("server_error", "DEPENDENCY_ERROR"),
        AppError::Config(_) | AppError::Internal => ("server_error", "INTERNAL_SERVER_ERROR"),
    };

    let message = if err.is_opaque() {
        tracing::error!(error = %err, retryable = err.is_retryable(), "request failed");
        "internal server error".to_string()
    } else {
        err.to_string()
    };

    let response = ErrorResponse::new(
        status.canonical_reason().unwrap_or("Error"),
        &message,
        status.as_u16(),
        error_type,
        code,
    );

    (status, response)
}

pub fn into_response(err: &AppError) -> HttpResponse {
    let (status, response) = map_error(err);
    HttpResponse::build(status).json(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_detail_is_not_leaked() {
        let (status, body) = map_error(&AppError::Database("PoolTimedOut".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "internal server error");
        assert_eq!(body.code, "DATABASE_ERROR");
    }

    #[test]
    fn client_errors_keep_their_message() {
        let (status, body) = map_error(&AppError::NotFound("post not found".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "post not found");
        assert_eq!(body.error_type, "not_found_error");

        let (status, body) = map_error(&AppError::Unauthorized);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.message, "unauthorized");
    }

    #[test]
    fn self_messaging_is_unprocessable() {
        let (status, body) =
            map_error(&AppError::InvalidOperation("cannot message yourself".into()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.code, "INVALID_OPERATION");
    }

    #[test]
    fn config_errors_are_opaque_server_errors() {
        let (status, body) = map_error(&AppError::Config("SERVER_SECRET missing".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(body.message, "internal server error");
    }
}
