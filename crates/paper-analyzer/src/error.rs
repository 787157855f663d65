//! Error types for the analyzer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::processing::JobStatus;
use crate::types::AnalysisResult;

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Analyzer errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Malformed request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Document parsed but yielded no text
    #[error("'{0}' contains no extractable text. It may be scanned/image-based.")]
    EmptyContent(String),

    /// Summarization quota exhausted after all retry attempts
    #[error("Rate limit exceeded after {attempts} attempts: {message}")]
    QuotaExceeded { attempts: u32, message: String },

    /// Rate limited on the synchronous path; carries the structure-only result
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        fallback: Box<AnalysisResult>,
    },

    /// Summarization service error
    #[error("Summarizer error: {0}")]
    Summarizer(String),

    /// Job not found
    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    /// Job has not reached a terminal state yet
    #[error("Job {job_id} is still processing (status: {status})")]
    StillProcessing { job_id: Uuid, status: JobStatus },

    /// Job reached the failed state
    #[error("Job {job_id} failed: {message}")]
    JobFailed { job_id: Uuid, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a summarizer error
    pub fn summarizer(message: impl Into<String>) -> Self {
        Self::Summarizer(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg.clone()),
            Error::FileParse { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "parse_error", self.to_string())
            }
            Error::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone()),
            Error::UnsupportedFileType(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_type",
                self.to_string(),
            ),
            Error::EmptyContent(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "empty_content", self.to_string())
            }
            Error::QuotaExceeded { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "rate_limited", self.to_string())
            }
            Error::RateLimited { message, fallback } => {
                let body = Json(json!({
                    "error": {
                        "type": "rate_limited",
                        "message": message,
                    },
                    "fallback": fallback,
                }));
                return (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            }
            Error::Summarizer(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "summarizer_error", msg.clone())
            }
            Error::JobNotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            Error::StillProcessing { job_id, status } => {
                let body = Json(json!({
                    "job_id": job_id,
                    "status": status,
                    "message": "Job is still processing. Poll the status endpoint.",
                }));
                return (StatusCode::ACCEPTED, body).into_response();
            }
            Error::JobFailed { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "job_failed", self.to_string())
            }
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error", err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
