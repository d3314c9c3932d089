//! Blocking conversion handler.

use super::parse_download_request;
use crate::api::AppState;
use crate::error::Error;
use crate::types::DownloadResponse;
use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
};

/// POST /download - Download and convert a URL, responding when done
///
/// Progress is reported on `/events` and `/ws` while this request is open.
/// Closing the connection early does not stop the job.
#[utoipa::path(
    post,
    path = "/download",
    tag = "download",
    request_body = crate::types::DownloadRequestBody,
    responses(
        (status = 200, description = "yt-dlp exited with status 0", body = DownloadResponse),
        (status = 400, description = "Missing url, unknown format or malformed body", body = crate::error::ApiError),
        (status = 413, description = "Body larger than 2 MB", body = crate::error::ApiError),
        (status = 500, description = "Launch failure, non-zero exit or cancellation", body = crate::error::ApiError),
        (status = 503, description = "Server is shutting down", body = crate::error::ApiError)
    )
)]
pub async fn download(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DownloadResponse>, Error> {
    let request = parse_download_request(&body?)?;
    state.converter.download(request).await?;
    Ok(Json(DownloadResponse::completed()))
}
