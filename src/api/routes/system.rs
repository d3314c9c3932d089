//! System handlers: health, capabilities, OpenAPI, events, shutdown.

use crate::api::AppState;
use crate::types::Event;
use axum::{
    Json,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
};
use futures::SinkExt;
use serde_json::json;
use std::convert::Infallible;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /capabilities - Query yt-dlp and supported formats
#[utoipa::path(
    get,
    path = "/capabilities",
    tag = "system",
    responses(
        (status = 200, description = "Current system capabilities", body = crate::types::Capabilities)
    )
)]
pub async fn get_capabilities(State(state): State<AppState>) -> impl IntoResponse {
    let capabilities = state.converter.capabilities().await;
    (StatusCode::OK, Json(capabilities))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3.1 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}

/// Payload sent to a subscriber that fell behind
fn lagged_payload(skipped: u64) -> serde_json::Value {
    json!({ "error": "lagged", "skipped": skipped })
}

/// GET /events - Server-sent events stream
///
/// Each SSE event is named after the job event (`started`, `progress`,
/// `complete`, `failed`, `cancelled`, `shutdown`) and carries it as JSON.
#[utoipa::path(
    get,
    path = "/events",
    tag = "system",
    responses(
        (status = 200, description = "Server-sent events stream (text/event-stream)", content_type = "text/event-stream")
    )
)]
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = state.converter.subscribe();
    let stream = BroadcastStream::new(receiver);

    let sse_stream = stream.filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json_data) => Some(Ok(SseEvent::default().event(event.name()).data(json_data))),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize event to JSON");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE client lagged");
            Some(Ok(SseEvent::default()
                .event("error")
                .data(lagged_payload(skipped).to_string())))
        }
    });

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}

/// GET /ws - WebSocket event stream
///
/// Every text frame is `{ "event": <name>, "data": <event> }` with the same
/// names and payloads as `/events`. Messages from the client are ignored.
#[utoipa::path(
    get,
    path = "/ws",
    tag = "system",
    responses(
        (status = 101, description = "Switching to the WebSocket protocol")
    )
)]
pub async fn websocket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let receiver = state.converter.subscribe();
    ws.on_upgrade(move |socket| forward_events(socket, receiver))
}

enum WsStep {
    Event(Event),
    Lagged(u64),
    Done,
    Ignore,
}

async fn forward_events(socket: WebSocket, mut events: broadcast::Receiver<Event>) {
    let (mut sender, mut incoming) = futures::StreamExt::split(socket);
    tracing::debug!("WebSocket client connected");

    loop {
        let step = tokio::select! {
            event = events.recv() => match event {
                Ok(event) => WsStep::Event(event),
                Err(RecvError::Lagged(skipped)) => WsStep::Lagged(skipped),
                Err(RecvError::Closed) => WsStep::Done,
            },
            message = incoming.next() => match message {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => WsStep::Done,
                Some(Ok(_)) => WsStep::Ignore,
            },
        };

        let frame = match step {
            WsStep::Event(event) => match serde_json::to_value(&event) {
                Ok(data) => json!({ "event": event.name(), "data": data }),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to serialize event to JSON");
                    continue;
                }
            },
            WsStep::Lagged(skipped) => {
                tracing::warn!(skipped, "WebSocket client lagged");
                json!({ "event": "error", "data": lagged_payload(skipped) })
            }
            WsStep::Ignore => continue,
            WsStep::Done => break,
        };

        if sender
            .send(Message::Text(frame.to_string()))
            .await
            .is_err()
        {
            break;
        }
    }

    tracing::debug!("WebSocket client disconnected");
}

/// POST /shutdown - Graceful shutdown
#[utoipa::path(
    post,
    path = "/shutdown",
    tag = "system",
    responses(
        (status = 202, description = "Shutdown initiated")
    )
)]
pub async fn shutdown(State(state): State<AppState>) -> impl IntoResponse {
    // Spawn the shutdown sequence in a background task so we can return the response first
    tokio::spawn(async move {
        // Small delay to allow the HTTP response to be sent
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        if let Err(e) = state.converter.shutdown().await {
            tracing::error!(error = %e, "Error during graceful shutdown");
        }

        std::process::exit(0);
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({"status": "shutdown initiated"})),
    )
}
