//! Error types for yt-converter
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error variants (validation, launch, download failure, etc.)
//! - HTTP status code mapping for API integration
//! - Structured error responses whose `error` field stays a plain string

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for yt-converter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to clients when the external tool exits non-zero
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Download failed.";

/// Message returned to clients when a job is cancelled before it finished
pub const DOWNLOAD_CANCELLED_MESSAGE: &str = "Download cancelled.";

/// Main error type for yt-converter
///
/// Each variant carries enough context to build the client-facing message.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// Request rejected before any work started (missing url, unknown format)
    #[error("{0}")]
    Validation(String),

    /// The external tool could not be started
    #[error("failed to launch {tool}: {message}")]
    Launch {
        /// Name or path of the binary that failed to start
        tool: String,
        /// Underlying OS error text
        message: String,
    },

    /// The external tool ran and exited with a non-zero status
    #[error("{}", DOWNLOAD_FAILED_MESSAGE)]
    DownloadFailed {
        /// Exit code, if the process exited normally
        code: Option<i32>,
    },

    /// The job was cancelled before completion
    #[error("{}", DOWNLOAD_CANCELLED_MESSAGE)]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Job not found
    #[error("job not found: {0}")]
    NotFound(String),

    /// Operation not valid in the job's current state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Shutdown in progress - not accepting new jobs
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// Request the HTTP layer could not extract (bad path parameter, oversized body)
    #[error("{message}")]
    Rejected {
        /// HTTP status chosen by the extractor
        status: u16,
        /// Extractor's description of the problem
        message: String,
    },

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// API error response format
///
/// Returned by API endpoints when an error occurs. `error` is the
/// human-readable message, `code` a machine-readable classification.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "Download failed.",
///   "code": "download_failed"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code (e.g., "validation_error", "launch_error")
    pub code: String,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
        }
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,

            Error::Rejected { status, .. } => *status,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 409 Conflict
            Error::InvalidState(_) => 409,

            // 500 Internal Server Error - launch failures and failed downloads
            Error::Launch { .. } => 500,
            Error::DownloadFailed { .. } => 500,
            Error::Cancelled => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Launch { .. } => "launch_error",
            Error::DownloadFailed { .. } => "download_failed",
            Error::Cancelled => "cancelled",
            Error::Io(_) => "io_error",
            Error::NotFound(_) => "not_found",
            Error::InvalidState(_) => "invalid_state",
            Error::ShuttingDown => "shutting_down",
            Error::Rejected { .. } => "invalid_request",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError::new(error.error_code(), error.to_string())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every variant.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::Config {
                    message: "bad value".into(),
                    key: Some("download_dir".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::Validation("missing url".into()),
                400,
                "validation_error",
            ),
            (
                Error::Launch {
                    tool: "yt-dlp".into(),
                    message: "No such file or directory".into(),
                },
                500,
                "launch_error",
            ),
            (
                Error::DownloadFailed { code: Some(1) },
                500,
                "download_failed",
            ),
            (Error::Cancelled, 500, "cancelled"),
            (
                Error::Io(std::io::Error::other("disk on fire")),
                500,
                "io_error",
            ),
            (Error::NotFound("job 7".into()), 404, "not_found"),
            (
                Error::InvalidState("job 7 is complete".into()),
                409,
                "invalid_state",
            ),
            (Error::ShuttingDown, 503, "shutting_down"),
            (
                Error::Rejected {
                    status: 413,
                    message: "length limit exceeded".into(),
                },
                413,
                "invalid_request",
            ),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (Error::Other("boom".into()), 500, "internal_error"),
        ]
    }

    #[test]
    fn test_status_and_error_codes_for_every_variant() {
        for (error, status, code) in all_error_variants() {
            assert_eq!(error.status_code(), status, "status for {:?}", error);
            assert_eq!(error.error_code(), code, "code for {:?}", error);
        }
    }

    #[test]
    fn test_download_failed_uses_generic_message() {
        // The exit code must not leak into the client-facing text
        let error = Error::DownloadFailed { code: Some(2) };
        assert_eq!(error.to_string(), DOWNLOAD_FAILED_MESSAGE);
    }

    #[test]
    fn test_cancelled_uses_client_message() {
        assert_eq!(Error::Cancelled.to_string(), DOWNLOAD_CANCELLED_MESSAGE);
        let api_error: ApiError = Error::Cancelled.into();
        assert_eq!(api_error.error, "Download cancelled.");
    }

    #[test]
    fn test_launch_error_carries_underlying_message() {
        let error = Error::Launch {
            tool: "/opt/missing/yt-dlp".into(),
            message: "No such file or directory (os error 2)".into(),
        };
        let api_error: ApiError = error.into();

        assert_eq!(api_error.code, "launch_error");
        assert!(api_error.error.contains("/opt/missing/yt-dlp"));
        assert!(api_error.error.contains("os error 2"));
    }

    #[test]
    fn test_validation_message_is_passed_through_verbatim() {
        let api_error: ApiError = Error::Validation("Invalid parameters.".into()).into();
        assert_eq!(api_error.error, "Invalid parameters.");
    }

    #[test]
    fn test_api_error_serializes_error_as_plain_string() {
        let json = serde_json::to_value(ApiError::new("validation_error", "nope")).unwrap();
        assert_eq!(json["error"], "nope");
        assert_eq!(json["code"], "validation_error");
    }

    #[test]
    fn test_api_error_helpers() {
        assert_eq!(ApiError::internal("x").code, "internal_error");
    }
}
