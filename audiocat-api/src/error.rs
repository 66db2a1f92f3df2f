//! Error types for audiocat-api
//!
//! Every failure an HTTP handler can hit maps to one `ApiError` variant, and
//! each variant owns its status code. Catalog misses are ordinary responses:
//! a plain-text 404 rather than a JSON error document.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::MetadataError;

/// Body of the not-found response for catalog lookups
pub const NOT_IN_DATABASE: &str = "Requested file not in database.";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Upload filename is empty or sanitizes to nothing (400)
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Multipart body could not be read (status chosen by axum, e.g. 413 over the body limit)
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Name already catalogued under the `reject` duplicate policy (409)
    #[error("File already exists: {0}")]
    Duplicate(String),

    /// Metadata extraction could not parse the upload (415)
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Writing an upload into storage failed (500)
    #[error("Storage write failed: {0}")]
    StorageWrite(#[source] std::io::Error),

    /// A catalogued file could not be read back from storage (500)
    #[error("Storage read failed: {0}")]
    StorageRead(String),

    /// Name not present in the catalog (404, plain text)
    #[error("Not in database: {0}")]
    NotFound(String),

    /// Path segment did not carry the expected `key=` prefix (404)
    #[error("No route: {0}")]
    NoRoute(String),

    /// Catalog query failed (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<audiocat_common::Error> for ApiError {
    fn from(err: audiocat_common::Error) -> Self {
        use audiocat_common::Error as Common;
        match err {
            Common::Database(e) => ApiError::Database(e),
            Common::Duplicate(name) => ApiError::Duplicate(name),
            Common::NotFound(name) => ApiError::NotFound(name),
            Common::InvalidInput(msg) => ApiError::BadRequest(msg),
            Common::Io(e) => ApiError::Internal(e.to_string()),
            Common::Config(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::UnsupportedFormat(msg) => ApiError::UnsupportedFormat(msg),
            MetadataError::IoError(e) => ApiError::StorageRead(e.to_string()),
            MetadataError::TaskFailed(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(_) => {
                return (StatusCode::NOT_FOUND, NOT_IN_DATABASE).into_response();
            }
            ApiError::NoRoute(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::InvalidFilename(ref name) => (
                StatusCode::BAD_REQUEST,
                "INVALID_FILENAME",
                format!("Invalid filename: {:?}", name),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Multipart(ref err) => (err.status(), "BAD_MULTIPART", err.body_text()),
            ApiError::Duplicate(ref name) => (
                StatusCode::CONFLICT,
                "DUPLICATE_NAME",
                format!("{} already exists", name),
            ),
            ApiError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                msg,
            ),
            ApiError::StorageWrite(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_WRITE_ERROR",
                err.to_string(),
            ),
            ApiError::StorageRead(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_READ_ERROR",
                msg,
            ),
            ApiError::Database(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                err.to_string(),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        if status.is_server_error() {
            error!(code = error_code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::InvalidFilename("..".into()), StatusCode::BAD_REQUEST),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Duplicate("a.wav".into()), StatusCode::CONFLICT),
            (ApiError::UnsupportedFormat("x".into()), StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (
                ApiError::StorageWrite(std::io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::StorageRead("gone".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::NotFound("a.wav".into()), StatusCode::NOT_FOUND),
            (ApiError::NoRoute("x".into()), StatusCode::NOT_FOUND),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_common_error_mapping() {
        let err: ApiError = audiocat_common::Error::Duplicate("a.wav".into()).into();
        assert!(matches!(err, ApiError::Duplicate(ref n) if n == "a.wav"));

        let err: ApiError = audiocat_common::Error::NotFound("b.wav".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_metadata_error_mapping() {
        let err: ApiError = MetadataError::UnsupportedFormat("not audio".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ApiError = MetadataError::IoError(io).into();
        assert!(matches!(err, ApiError::StorageRead(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ApiError = MetadataError::TaskFailed("cancelled".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
