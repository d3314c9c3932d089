use super::*;
use crate::types::INVALID_PARAMETERS_MESSAGE;

#[tokio::test]
async fn test_unsupported_format_is_rejected_before_launch() {
    let (converter, _temp_dir) = create_test_converter();
    let app = router_for(&converter);

    let response = app
        .oneshot(json_request(
            "POST",
            "/download",
            r#"{"url":"https://youtu.be/abc","format":"wav"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], INVALID_PARAMETERS_MESSAGE);

    // Nothing was launched, so no job exists
    assert!(converter.list_jobs().await.is_empty());
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let (converter, _temp_dir) = create_test_converter();
    let app = router_for(&converter);

    for body in [
        r#"{"format":"mp3"}"#,
        r#"{"url":"https://youtu.be/abc"}"#,
        r#"{"url":"","format":"mp3"}"#,
        r#"{}"#,
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/download", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(body_json(response).await["error"], INVALID_PARAMETERS_MESSAGE);
    }
}

#[tokio::test]
async fn test_malformed_json_is_rejected_with_json_error() {
    let (converter, _temp_dir) = create_test_converter();
    let app = router_for(&converter);

    let response = app
        .oneshot(json_request("POST", "/download", "{ not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "validation_error");
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_missing_binary_is_500_with_launch_message() {
    let (converter, _temp_dir) = create_test_converter();
    let app = router_for(&converter);

    let response = app
        .oneshot(json_request(
            "POST",
            "/download",
            r#"{"url":"https://youtu.be/abc","format":"mp3"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["code"], "launch_error");
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("/nonexistent/path/to/yt-dlp")
    );
}

#[tokio::test]
async fn test_oversized_body_is_json_413() {
    let (converter, _temp_dir) = create_test_converter();
    let app = router_for(&converter);

    // Larger than axum's default 2 MB body limit
    let url = "a".repeat(3 * 1024 * 1024);
    let body = format!(r#"{{"url":"{url}","format":"mp3"}}"#);

    let response = app
        .oneshot(json_request("POST", "/download", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert!(body["error"].is_string());
    assert!(converter.list_jobs().await.is_empty());
}

#[tokio::test]
async fn test_bare_options_request_is_answered_by_cors_layer() {
    let (converter, _temp_dir) = create_test_converter();
    let app = router_for(&converter);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/download")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_options_without_cors_is_method_not_allowed() {
    let (converter, _temp_dir) = create_test_converter();
    let mut config = (*converter.get_config()).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(converter, Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/download")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_download_refused_during_shutdown() {
    let (converter, _temp_dir) = create_test_converter();
    converter.shutdown().await.unwrap();
    let app = router_for(&converter);

    let response = app
        .oneshot(json_request(
            "POST",
            "/download",
            r#"{"url":"https://youtu.be/abc","format":"mp4"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "shutting_down");
}

#[cfg(unix)]
mod with_fake_ytdlp {
    use super::*;
    use crate::converter::test_helpers::{FAILING_SCRIPT, PROGRESS_SCRIPT, SILENT_SUCCESS_SCRIPT};

    #[tokio::test]
    async fn test_successful_download_is_200() {
        let (converter, _temp_dir) = create_scripted_converter(PROGRESS_SCRIPT);
        let app = router_for(&converter);

        let response = app
            .oneshot(json_request(
                "POST",
                "/download",
                r#"{"url":"https://youtu.be/abc","format":"mp3"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "Download completed successfully." })
        );
    }

    #[tokio::test]
    async fn test_success_without_progress_is_still_200() {
        let (converter, _temp_dir) = create_scripted_converter(SILENT_SUCCESS_SCRIPT);
        let app = router_for(&converter);

        let response = app
            .oneshot(json_request(
                "POST",
                "/download",
                r#"{"url":"https://youtu.be/abc","format":"mp4"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_500_download_failed() {
        let (converter, _temp_dir) = create_scripted_converter(FAILING_SCRIPT);
        let app = router_for(&converter);

        let response = app
            .oneshot(json_request(
                "POST",
                "/download",
                r#"{"url":"https://youtu.be/abc","format":"mp3"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Download failed.");
        assert_eq!(body["code"], "download_failed");
    }
}
