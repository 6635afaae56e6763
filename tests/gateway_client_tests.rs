// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tests of the reqwest gateway client against an in-process stub of
//! the upstream chat-completions endpoint.

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use caltrack::error::AppError;
use caltrack::services::{AiGatewayClient, VisionGateway};
use serde_json::json;

const IMAGE: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

/// Serve a stub upstream on an ephemeral port, returning its base URL.
async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: String) -> AiGatewayClient {
    AiGatewayClient::new(base_url, "test-model".to_string(), Some("sk-test".to_string()))
}

#[tokio::test]
async fn test_success_reply_and_quota_headers() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|Json(body): Json<serde_json::Value>| async move {
            // The request must carry the model and the image data URI.
            assert_eq!(body["model"], "test-model");
            let content = body["messages"][1]["content"]
                .as_array()
                .unwrap()
                .iter()
                .find(|part| part["type"] == "image_url")
                .unwrap();
            assert_eq!(content["image_url"]["url"], IMAGE);

            let mut headers = HeaderMap::new();
            headers.insert("x-ratelimit-limit", "60".parse().unwrap());
            headers.insert("x-ratelimit-remaining", "59".parse().unwrap());
            (
                headers,
                Json(json!({
                    "choices": [
                        { "message": { "content": "{\"food_name\":\"Toast\",\"calories\":120}" } }
                    ]
                })),
            )
        }),
    );
    let base = spawn_upstream(app).await;

    let reply = client(base).analyze_image(IMAGE).await.unwrap();
    assert!(reply.content.contains("Toast"));
    assert_eq!(reply.rate_limit.limit.as_deref(), Some("60"));
    assert_eq!(reply.rate_limit.remaining.as_deref(), Some("59"));
}

#[tokio::test]
async fn test_upstream_429_with_retry_after() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            let mut headers = HeaderMap::new();
            headers.insert("retry-after", "17".parse().unwrap());
            (StatusCode::TOO_MANY_REQUESTS, headers, "slow down")
        }),
    );
    let base = spawn_upstream(app).await;

    let err = client(base).analyze_image(IMAGE).await.unwrap_err();
    match err {
        AppError::RateLimited { retry_after } => assert_eq!(retry_after.as_deref(), Some("17")),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upstream_402_is_credits_exhausted() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::PAYMENT_REQUIRED, "no credits") }),
    );
    let base = spawn_upstream(app).await;

    let err = client(base).analyze_image(IMAGE).await.unwrap_err();
    assert!(matches!(err, AppError::CreditsExhausted));
}

#[tokio::test]
async fn test_other_upstream_failure_keeps_body_for_logs() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (StatusCode::SERVICE_UNAVAILABLE, "backend az-4 overloaded").into_response()
        }),
    );
    let base = spawn_upstream(app).await;

    let err = client(base).analyze_image(IMAGE).await.unwrap_err();
    match &err {
        // The detail is kept for server-side logging...
        AppError::UpstreamFailure(detail) => assert!(detail.contains("az-4")),
        other => panic!("expected UpstreamFailure, got {other:?}"),
    }
    // ...but the client-facing message stays generic.
    assert_eq!(err.client_message(), "AI processing error");
}

#[tokio::test]
async fn test_reply_without_content_is_parse_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({ "choices": [] })) }),
    );
    let base = spawn_upstream(app).await;

    let err = client(base).analyze_image(IMAGE).await.unwrap_err();
    assert!(matches!(err, AppError::ResponseParse(_)));
}
