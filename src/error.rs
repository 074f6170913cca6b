use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::shuffle::ShuffleType;

pub type Result<T> = std::result::Result<T, ShuffleError>;

#[derive(Debug, Error)]
pub enum ShuffleError {
    #[error("Please provide random_nums in the request body")]
    MissingField,

    #[error("random_nums must be a positive integer")]
    InvalidType,

    #[error("random_nums must not exceed {max}")]
    PlaylistTooLarge { max: u64 },

    #[error("Request body must be valid JSON")]
    MalformedJson,

    #[error("Invalid shuffle type")]
    InvalidShuffleType,

    #[error("Shuffle type '{0}' is not implemented")]
    NotImplemented(ShuffleType),

    #[error("History log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("History log is corrupt: {0}")]
    CorruptLog(String),

    #[error("History log lock poisoned")]
    LockPoisoned,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShuffleError {
    /// Client-caused errors, reported with a structured body.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ShuffleError::MissingField
                | ShuffleError::InvalidType
                | ShuffleError::PlaylistTooLarge { .. }
                | ShuffleError::MalformedJson
                | ShuffleError::InvalidShuffleType
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            ShuffleError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the response for this error. Persistence faults get a bare 500
    /// unless `structured` is set.
    pub fn to_response(&self, structured: bool) -> Response {
        let status = self.status_code();
        if status.is_server_error() && !matches!(self, ShuffleError::NotImplemented(_)) {
            tracing::error!(error = %self, "Shuffle request failed");
            if !structured {
                return status.into_response();
            }
            return (status, Json(ErrorResponse::new("Internal server error"))).into_response();
        }

        (status, Json(ErrorResponse::new(&self.to_string()))).into_response()
    }
}

impl IntoResponse for ShuffleError {
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_bad_request() {
        assert_eq!(ShuffleError::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ShuffleError::InvalidType.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ShuffleError::InvalidShuffleType.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ShuffleError::PlaylistTooLarge { max: 10 }.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_persistence_faults_are_internal() {
        let err = ShuffleError::CorruptLog("expected value".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_validation());
    }

    #[test]
    fn test_not_implemented_status() {
        let err = ShuffleError::NotImplemented(ShuffleType::Weighted);
        assert_eq!(err.status_code(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(err.to_string(), "Shuffle type 'weighted' is not implemented");
    }

    #[test]
    fn test_messages_match_wire_contract() {
        assert_eq!(
            ShuffleError::MissingField.to_string(),
            "Please provide random_nums in the request body"
        );
        assert_eq!(
            ShuffleError::InvalidType.to_string(),
            "random_nums must be a positive integer"
        );
        assert_eq!(ShuffleError::InvalidShuffleType.to_string(), "Invalid shuffle type");
    }
}
