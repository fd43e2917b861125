use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortlink_core::{CoreError, ShortenerError};
use shortlink_redirector::RedirectorError;
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("invalid request body: {err}"))
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<ShortenerError> for AppError {
    fn from(err: ShortenerError) -> Self {
        match err {
            ShortenerError::InvalidUrl(_) => AppError::BadRequest(err.to_string()),
            ShortenerError::Conflict(code) => {
                AppError::Conflict(format!("short code '{code}' is already in use"))
            }
            ShortenerError::Storage(e) => {
                error!(error = %e, "shortener storage failure");
                AppError::Internal("failed to process request".to_string())
            }
        }
    }
}

impl From<RedirectorError> for AppError {
    fn from(err: RedirectorError) -> Self {
        match err {
            RedirectorError::NotFound(_) => AppError::NotFound("URL not found".to_string()),
            RedirectorError::Storage(e) => {
                error!(error = %e, "redirect storage failure");
                AppError::Internal("failed to resolve URL".to_string())
            }
        }
    }
}
