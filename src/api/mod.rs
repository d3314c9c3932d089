//! REST API server module
//!
//! Provides an OpenAPI 3.1 compliant REST API for converting media URLs,
//! inspecting running jobs, and streaming progress events to browsers.

use crate::{Config, Converter, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Conversion
/// - `POST /download` - Run a job and respond when yt-dlp exits
/// - `OPTIONS /download` - Preflight, answered by the CORS layer
///
/// ## Jobs
/// - `POST /jobs` - Start a job in the background
/// - `GET /jobs` - List running and recently finished jobs
/// - `GET /jobs/:id` - Get single job
/// - `DELETE /jobs/:id` - Cancel a running job
///
/// ## System
/// - `GET /capabilities` - yt-dlp binary, version and formats
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream
/// - `GET /ws` - WebSocket event stream
/// - `POST /shutdown` - Graceful shutdown
pub fn create_router(converter: Arc<Converter>, config: Arc<Config>) -> Router {
    let state = AppState::new(converter, config.clone());

    let router = Router::new()
        // Conversion
        .route("/download", post(routes::download))
        // Jobs
        .route("/jobs", get(routes::list_jobs))
        .route("/jobs", post(routes::create_job))
        .route("/jobs/:id", get(routes::get_job))
        .route("/jobs/:id", delete(routes::cancel_job))
        // System
        .route("/capabilities", get(routes::get_capabilities))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream))
        .route("/ws", get(routes::websocket))
        .route("/shutdown", post(routes::shutdown));

    // Swagger UI serves its own copy of the document so it does not collide with /openapi.json
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    // CORS is outermost so preflight requests are answered before routing
    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. All methods and headers are allowed either way.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server stops, either due to an error or process exit.
///
/// # Example
///
/// ```no_run
/// use yt_converter::{Config, Converter};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let converter = Arc::new(Converter::new((*config).clone()).await?);
///
/// // Start API server (blocks until shutdown)
/// yt_converter::api::start_api_server(converter, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(converter: Arc<Converter>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    serve(listener, converter, config).await
}

/// Serve the API on an already bound listener
///
/// Useful when binding port 0 and reading the assigned address back.
pub async fn serve(
    listener: TcpListener,
    converter: Arc<Converter>,
    config: Arc<Config>,
) -> Result<()> {
    let address = listener.local_addr().map_err(crate::error::Error::Io)?;
    let app = create_router(converter, config);

    tracing::info!(address = %address, "API server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
