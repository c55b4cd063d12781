use crate::middleware::error_handling;
use actix_web::{HttpResponse, ResponseError};
use page_cursor::CursorError;
use thiserror::Error;

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        error_handling::into_response(self)
    }

    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(AppError::status_code(self))
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed client input. Raised before any side effect.
    #[error("{0}")]
    BadRequest(String),

    /// Caller is not allowed to see the resource. Deliberately generic.
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Well-formed request the domain refuses, e.g. messaging yourself.
    #[error("{0}")]
    InvalidOperation(String),

    #[error("database error: {0}")]
    Database(String),

    /// A collaborator outside this service failed (push provider, identity lookup).
    #[error("dependency error: {0}")]
    Dependency(String),

    #[error("internal server error")]
    Internal,
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(format!("{e:?}"))
    }
}

impl From<CursorError> for AppError {
    fn from(_: CursorError) -> Self {
        AppError::BadRequest("invalid cursor".to_string())
    }
}

impl AppError {
    /// Returns whether this error is retryable (e.g., database connection timeout)
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Database(msg) => {
                msg.contains("PoolTimedOut") || msg.contains("PoolClosed") || msg.contains("Io")
            }
            AppError::Dependency(_) | AppError::Internal => true,
            _ => false,
        }
    }

    /// Returns HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Unauthorized => 401,
            AppError::NotFound(_) => 404,
            AppError::InvalidOperation(_) => 422,
            AppError::Config(_)
            | AppError::Database(_)
            | AppError::Dependency(_)
            | AppError::Internal => 500,
        }
    }

    /// Errors whose detail must stay in the logs.
    pub fn is_opaque(&self) -> bool {
        self.status_code() >= 500
    }
}
