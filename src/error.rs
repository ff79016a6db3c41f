use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::database::DbError;
use crate::result::{ApiResponse, error_codes};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("User already exists")]
    UserExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized - No valid session")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Too many requests, retry in {0} seconds")]
    RateLimited(u64),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    fn parts(&self) -> (StatusCode, i32, String) {
        let (status, code) = match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::UserExists => (StatusCode::BAD_REQUEST, error_codes::USER_EXISTS),
            AppError::InvalidCredentials | AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED)
            }
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, error_codes::RATE_LIMIT),
            // 内部错误细节只写日志，不返回给客户端
            AppError::Internal(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "Internal server error".to_string(),
                );
            }
        };
        (status, code, self.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!("Request failed: {}", detail);
        }
        let (status, code, msg) = self.parts();
        (status, Json(ApiResponse::<()>::error(code, msg))).into_response()
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate("email") => AppError::UserExists,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("token generation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_client_message() {
        assert_eq!(AppError::UserExists.to_string(), "User already exists");
        assert_eq!(AppError::validation("Title is required").to_string(), "Title is required");
        assert_eq!(
            AppError::RateLimited(60).to_string(),
            "Too many requests, retry in 60 seconds"
        );
        assert_eq!(
            AppError::Internal("pool closed".to_string()).to_string(),
            "internal error: pool closed"
        );
    }

    #[test]
    fn internal_detail_stays_out_of_response() {
        let (status, code, msg) = AppError::Internal("pool closed".to_string()).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, error_codes::INTERNAL_ERROR);
        assert_eq!(msg, "Internal server error");

        let (status, code, msg) = AppError::Unauthorized.parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, error_codes::AUTH_FAILED);
        assert_eq!(msg, "Unauthorized - No valid session");
    }

    #[test]
    fn duplicate_email_maps_to_user_exists() {
        let err: AppError = DbError::Duplicate("email").into();
        assert!(matches!(err, AppError::UserExists));
        let _: &dyn std::error::Error = &err;
    }
}
