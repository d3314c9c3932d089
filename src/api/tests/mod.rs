use super::*;
use crate::converter::test_helpers;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;

mod download;

/// Converter whose yt-dlp binary does not exist, wrapped in Arc
fn create_test_converter() -> (Arc<Converter>, tempfile::TempDir) {
    let (converter, temp_dir) = test_helpers::create_converter_without_ytdlp();
    (Arc::new(converter), temp_dir)
}

/// Converter running a fake yt-dlp shell script, wrapped in Arc
#[cfg(unix)]
fn create_scripted_converter(script: &str) -> (Arc<Converter>, tempfile::TempDir) {
    let (converter, temp_dir) = test_helpers::create_test_converter(script);
    (Arc::new(converter), temp_dir)
}

fn router_for(converter: &Arc<Converter>) -> Router {
    create_router(converter.clone(), converter.get_config())
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (converter, _temp_dir) = create_test_converter();

    let mut config = (*converter.get_config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let converter = converter.clone();
        let config = config.clone();
        async move { start_api_server(converter, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");
    api_handle.abort();
}

#[tokio::test]
async fn test_serve_on_bound_listener() {
    let (converter, _temp_dir) = create_test_converter();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let handle = tokio::spawn({
        let converter = converter.clone();
        let config = converter.get_config();
        async move { serve(listener, converter, config).await }
    });

    let body = reqwest::get(format!("http://{address}/health"))
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");

    handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let (converter, _temp_dir) = create_test_converter();
    let app = router_for(&converter);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_preflight_for_download_from_any_origin() {
    let (converter, _temp_dir) = create_test_converter();
    let app = router_for(&converter);

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/download")
        .header("Origin", "http://example.com")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    assert!(response.headers().contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let (converter, _temp_dir) = create_test_converter();
    let mut config = (*converter.get_config()).clone();
    config.server.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = create_router(converter, Arc::new(config));

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://allowed.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        allowed.headers().get("access-control-allow-origin").unwrap(),
        "http://allowed.example"
    );

    let denied = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(!denied.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_disabled() {
    let (converter, _temp_dir) = create_test_converter();
    let mut config = (*converter.get_config()).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(converter, Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_spawn_api_server_method() {
    let (converter, _temp_dir) = create_test_converter();

    let api_handle = converter.spawn_api_server();

    tokio::time::sleep(Duration::from_millis(100)).await;
    api_handle.abort();
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (converter, _temp_dir) = create_test_converter();
    let app = router_for(&converter);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/downloads")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
