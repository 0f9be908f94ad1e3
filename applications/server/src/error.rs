/// Server error types
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tunebox_core::TuneboxError;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing, malformed or expired token, or bad credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Duplicate registration or playlist membership
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Range request outside the file; carries the file length
    #[error("Range not satisfiable for length {0}")]
    RangeNotSatisfiable(u64),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] TuneboxError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl From<tunebox_storage::StorageError> for ServerError {
    fn from(err: tunebox_storage::StorageError) -> Self {
        // Convert StorageError -> TuneboxError -> ServerError
        ServerError::Database(err.into())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl ServerError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Auth(_) | ServerError::Jwt(_) => StatusCode::UNAUTHORIZED,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) | ServerError::Conflict(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ServerError::RangeNotSatisfiable(_) => StatusCode::RANGE_NOT_SATISFIABLE,
            ServerError::Database(e) => match e {
                TuneboxError::Duplicate(_) => StatusCode::BAD_REQUEST,
                TuneboxError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Internal(_)
            | ServerError::Config(_)
            | ServerError::Io(_)
            | ServerError::Bcrypt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self {
            ServerError::Auth(msg)
            | ServerError::NotFound(msg)
            | ServerError::BadRequest(msg)
            | ServerError::Conflict(msg)
            | ServerError::PayloadTooLarge(msg)
            | ServerError::UnsupportedMediaType(msg) => msg,
            ServerError::RangeNotSatisfiable(len) => {
                let body = Json(json!({ "error": "Requested range not satisfiable" }));
                return (status, [(header::CONTENT_RANGE, format!("bytes */{len}"))], body)
                    .into_response();
            }
            ServerError::Jwt(ref e) => {
                tracing::warn!("JWT error: {:?}", e);
                "Invalid token".to_string()
            }
            ServerError::Database(e) => match e {
                TuneboxError::Duplicate(msg) => msg,
                TuneboxError::Storage(msg) => {
                    tracing::error!("Database error: {}", msg);
                    "Database error".to_string()
                }
            },
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                "Configuration error".to_string()
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                "IO error".to_string()
            }
            ServerError::Bcrypt(ref e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                "Password error".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_maps_to_bad_request() {
        assert_eq!(
            ServerError::Conflict("taken".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(TuneboxError::duplicate("taken")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn upload_rejections_have_distinct_statuses() {
        assert_eq!(
            ServerError::PayloadTooLarge("big".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ServerError::UnsupportedMediaType("text/plain".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn storage_failures_are_internal() {
        let err = ServerError::from(TuneboxError::storage("disk on fire"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn storage_detail_stays_out_of_the_body() {
        let response = ServerError::from(TuneboxError::storage("disk on fire")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8_lossy(&bytes);
        assert!(body.contains("Database error"));
        assert!(!body.contains("disk on fire"));
    }
}
