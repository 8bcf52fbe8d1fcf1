use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::menu::MenuError;

/// RepoError
///
/// Failures raised by a `Repository` implementation.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// AppError
///
/// The error half of every handler result. Client-facing variants carry a
/// message that is returned verbatim; infrastructure variants are logged and
/// answered with a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("service unavailable")]
    Unavailable(#[from] MenuError),

    #[error("repository error")]
    Repository(#[from] RepoError),

    #[error("internal server error")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Repository(RepoError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Repository(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Unavailable(e) => {
                tracing::error!(error = %e, "menu dependency unavailable");
                self.to_string()
            }
            AppError::Repository(e) => {
                tracing::error!(error = %e, "repository error");
                if status == StatusCode::SERVICE_UNAVAILABLE {
                    "service unavailable".to_string()
                } else {
                    "internal server error".to_string()
                }
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
