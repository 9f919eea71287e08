use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::schema::ValidationErrors;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(ValidationErrors),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<docstore::StoreError> for ApiError {
    fn from(e: docstore::StoreError) -> Self {
        match e {
            docstore::StoreError::Unavailable(msg) => ApiError::StoreUnavailable(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<filestore::FileStoreError> for ApiError {
    fn from(e: filestore::FileStoreError) -> Self {
        match e {
            filestore::FileStoreError::UnsupportedMediaType(msg) => {
                ApiError::UnsupportedMediaType(msg)
            }
            filestore::FileStoreError::NotFound(identifier) => {
                ApiError::NotFound(format!("video file {identifier:?}"))
            }
            filestore::FileStoreError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        ApiError::InvalidRequest(format!("malformed multipart body: {e}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "ValidationError"),
            ApiError::UnsupportedMediaType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UnsupportedMediaType")
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::StoreUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "StoreUnavailable")
            }
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "InvalidRequest"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        };

        let body = match self {
            // Internal detail is logged, never exposed.
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                json!({"error": code, "message": "internal server error"})
            }
            ApiError::Validation(errors) => {
                json!({"error": code, "message": "validation failed", "fields": errors})
            }
            other => json!({"error": code, "message": other.to_string()}),
        };

        (status, Json(body)).into_response()
    }
}
