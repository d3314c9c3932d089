//! Background job handlers: create, list, get, cancel.

use super::parse_download_request;
use crate::api::AppState;
use crate::error::Error;
use crate::types::{JobAccepted, JobId, JobInfo};
use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, State,
        rejection::{BytesRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

/// POST /jobs - Start a job without waiting for it
#[utoipa::path(
    post,
    path = "/jobs",
    tag = "jobs",
    request_body = crate::types::DownloadRequestBody,
    responses(
        (status = 202, description = "Job started", body = JobAccepted),
        (status = 400, description = "Missing url, unknown format or malformed body", body = crate::error::ApiError),
        (status = 413, description = "Body larger than 2 MB", body = crate::error::ApiError),
        (status = 503, description = "Server is shutting down", body = crate::error::ApiError)
    )
)]
pub async fn create_job(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, Error> {
    let request = parse_download_request(&body?)?;
    let handle = state.converter.submit(request).await?;

    Ok((StatusCode::ACCEPTED, Json(JobAccepted { id: handle.id })))
}

/// GET /jobs - List running and recently finished jobs
#[utoipa::path(
    get,
    path = "/jobs",
    tag = "jobs",
    responses(
        (status = 200, description = "Jobs, oldest first", body = Vec<JobInfo>)
    )
)]
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<JobInfo>> {
    Json(state.converter.list_jobs().await)
}

/// GET /jobs/:id - Get a single job
#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "jobs",
    params(
        ("id" = u64, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job details", body = JobInfo),
        (status = 400, description = "Job ID is not a number", body = crate::error::ApiError),
        (status = 404, description = "Job not found", body = crate::error::ApiError)
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<JobInfo>, Error> {
    let Path(id) = id?;
    Ok(Json(state.converter.get_job(JobId(id)).await?))
}

/// DELETE /jobs/:id - Cancel a running job
///
/// The subprocess is killed asynchronously; the job shows up as `cancelled`
/// once it has exited.
#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    tag = "jobs",
    params(
        ("id" = u64, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Cancellation requested"),
        (status = 400, description = "Job ID is not a number", body = crate::error::ApiError),
        (status = 404, description = "Job not found", body = crate::error::ApiError),
        (status = 409, description = "Job already finished", body = crate::error::ApiError)
    )
)]
pub async fn cancel_job(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(id) = id?;
    state.converter.cancel(JobId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
