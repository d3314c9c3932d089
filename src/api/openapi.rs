//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the yt-converter REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the yt-converter REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "yt-converter REST API",
        version = "0.1.0",
        description = "Download media URLs as mp3 or mp4 with yt-dlp and follow progress in real time",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Conversion
        crate::api::routes::download,

        // Jobs
        crate::api::routes::create_job,
        crate::api::routes::list_jobs,
        crate::api::routes::get_job,
        crate::api::routes::cancel_job,

        // System
        crate::api::routes::get_capabilities,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
        crate::api::routes::websocket,
        crate::api::routes::shutdown,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::MediaFormat,
        crate::types::JobStatus,
        crate::types::JobInfo,
        crate::types::JobAccepted,
        crate::types::DownloadRequestBody,
        crate::types::DownloadResponse,
        crate::types::Event,
        crate::types::Capabilities,
        crate::types::FetcherInfo,

        // Config types from config.rs
        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::ToolsConfig,
        crate::config::ServerIntegrationConfig,
        crate::config::ApiConfig,

        // Error types from error.rs
        crate::error::ApiError,
    )),
    tags(
        (name = "download", description = "Conversion - Run yt-dlp and wait for the result"),
        (name = "jobs", description = "Jobs - Start conversions in the background, inspect and cancel them"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events, shutdown"),
    )
)]
pub struct ApiDoc;
