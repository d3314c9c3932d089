//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`download`] - Blocking conversion endpoint
//! - [`jobs`] - Background jobs and their inspection
//! - [`system`] - Health, capabilities, events, OpenAPI, shutdown

use crate::error::{Error, Result};
use crate::types::{DownloadRequest, DownloadRequestBody};

mod download;
mod jobs;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use download::*;
pub use jobs::*;
pub use system::*;

/// Parse and validate a `{ "url", "format" }` body
///
/// The body is taken as raw bytes so that malformed JSON becomes the same
/// 400 `{ "error" }` response as a missing field, instead of axum's plain
/// text rejection.
pub(crate) fn parse_download_request(body: &[u8]) -> Result<DownloadRequest> {
    let body: DownloadRequestBody = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed request body");
        Error::Validation(format!("Invalid request body: {}", e))
    })?;

    body.try_into()
}
