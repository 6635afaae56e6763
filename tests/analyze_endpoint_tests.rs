// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Black-box tests of the analysis endpoint: origin control, payload
//! validation, upstream error normalization, and the success envelope.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use caltrack::error::AppError;
use common::{
    assert_failure, body_json, create_test_app, post_analyze, ScriptedGateway, ALLOWED_ORIGIN,
    GOOD_REPLY,
};
use serde_json::json;
use tower::ServiceExt;

const VALID_IMAGE: &str = "data:image/png;base64,aGVsbG8gd29ybGQ=";

#[tokio::test]
async fn test_successful_analysis_envelope() {
    let gateway = ScriptedGateway::replying(GOOD_REPLY);
    let app = create_test_app(gateway.clone());

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({ "imageBase64": VALID_IMAGE })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let header_id = response
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["requestId"].as_str().unwrap(), header_id);
    assert_eq!(body["analysis"]["food_name"], "Grilled salmon with rice");
    assert_eq!(body["analysis"]["calories"], 520);
    assert_eq!(body["analysis"]["meal_type"], "dinner");
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn test_rate_limit_headers_relayed_on_success() {
    let gateway = ScriptedGateway::replying_with_headers(
        GOOD_REPLY,
        caltrack::models::RateLimitInfo {
            limit: Some("60".to_string()),
            remaining: Some("42".to_string()),
            reset: Some("1755945600".to_string()),
        },
    );
    let app = create_test_app(gateway);

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({ "imageBase64": VALID_IMAGE })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-ratelimit-limit").unwrap(), "60");
    assert_eq!(response.headers().get("x-ratelimit-remaining").unwrap(), "42");
    assert_eq!(
        response.headers().get("x-ratelimit-reset").unwrap(),
        "1755945600"
    );
}

#[tokio::test]
async fn test_missing_image_field_is_400() {
    // Scenario: payload without imageBase64.
    let gateway = ScriptedGateway::replying(GOOD_REPLY);
    let app = create_test_app(gateway.clone());

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({})).await;
    let message = assert_failure(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Image data is required");
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_body_is_400() {
    let gateway = ScriptedGateway::replying(GOOD_REPLY);
    let app = create_test_app(gateway.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze")
                .header(header::ORIGIN, ALLOWED_ORIGIN)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    let message = assert_failure(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Request body must be valid JSON");
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_bad_data_uri_is_400() {
    let gateway = ScriptedGateway::replying(GOOD_REPLY);
    let app = create_test_app(gateway.clone());

    let response = post_analyze(
        app,
        ALLOWED_ORIGIN,
        json!({ "imageBase64": "data:image/tiff;base64,aGVsbG8=" }),
    )
    .await;
    let message = assert_failure(response, StatusCode::BAD_REQUEST).await;
    assert!(message.starts_with("Invalid image format"));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_disallowed_origin_is_403_before_upstream() {
    // Scenario: unknown origin is refused with no gateway call.
    let gateway = ScriptedGateway::replying(GOOD_REPLY);
    let app = create_test_app(gateway.clone());

    let response = post_analyze(
        app,
        "https://evil.example.com",
        json!({ "imageBase64": VALID_IMAGE }),
    )
    .await;
    let message = assert_failure(response, StatusCode::FORBIDDEN).await;
    assert_eq!(message, "Origin not allowed");
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_preflight_always_answered() {
    let app = create_test_app(ScriptedGateway::replying(GOOD_REPLY));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/analyze")
                .header(header::ORIGIN, ALLOWED_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        ALLOWED_ORIGIN
    );

    // Unknown origins still get a preflight answer, with the default
    // origin's grant.
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/analyze")
                .header(header::ORIGIN, "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_some());
}

#[tokio::test]
async fn test_upstream_429_maps_to_429_with_retry_after() {
    // Scenario: gateway rate limit is relayed with its reset time.
    let gateway = ScriptedGateway::failing(|| AppError::RateLimited {
        retry_after: Some("30".to_string()),
    });
    let app = create_test_app(gateway);

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({ "imageBase64": VALID_IMAGE })).await;
    assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "30");
    let message = assert_failure(response, StatusCode::TOO_MANY_REQUESTS).await;
    assert!(message.contains("Too many requests"));
}

#[tokio::test]
async fn test_upstream_429_without_reset_omits_retry_after() {
    let gateway = ScriptedGateway::failing(|| AppError::RateLimited { retry_after: None });
    let app = create_test_app(gateway);

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({ "imageBase64": VALID_IMAGE })).await;
    assert!(response.headers().get(header::RETRY_AFTER).is_none());
    assert_failure(response, StatusCode::TOO_MANY_REQUESTS).await;
}

#[tokio::test]
async fn test_upstream_402_maps_to_402() {
    let gateway = ScriptedGateway::failing(|| AppError::CreditsExhausted);
    let app = create_test_app(gateway);

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({ "imageBase64": VALID_IMAGE })).await;
    let message = assert_failure(response, StatusCode::PAYMENT_REQUIRED).await;
    assert!(message.contains("credits"));
}

#[tokio::test]
async fn test_upstream_failure_detail_never_leaks() {
    let gateway = ScriptedGateway::failing(|| {
        AppError::UpstreamFailure("HTTP 503: internal backend az-4 overloaded".to_string())
    });
    let app = create_test_app(gateway);

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({ "imageBase64": VALID_IMAGE })).await;
    let message = assert_failure(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(message, "AI processing error");
}

#[tokio::test]
async fn test_missing_api_key_is_configuration_error() {
    let gateway = ScriptedGateway::failing(|| AppError::GatewayNotConfigured);
    let app = create_test_app(gateway);

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({ "imageBase64": VALID_IMAGE })).await;
    let message = assert_failure(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(message, "Service configuration error");
}

#[tokio::test]
async fn test_unparseable_model_output_is_500() {
    let gateway = ScriptedGateway::replying("the dish appears to be salmon");
    let app = create_test_app(gateway);

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({ "imageBase64": VALID_IMAGE })).await;
    let message = assert_failure(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(message, "Error processing AI response");
}

#[tokio::test]
async fn test_incomplete_model_output_is_500() {
    let gateway = ScriptedGateway::replying(r#"{"food_name": "Salmon"}"#);
    let app = create_test_app(gateway);

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({ "imageBase64": VALID_IMAGE })).await;
    let message = assert_failure(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(message, "Incomplete analysis from AI service");
}

#[tokio::test]
async fn test_fenced_model_output_still_succeeds() {
    let gateway = ScriptedGateway::replying(&format!("```json\n{GOOD_REPLY}\n```"));
    let app = create_test_app(gateway);

    let response = post_analyze(app, ALLOWED_ORIGIN, json!({ "imageBase64": VALID_IMAGE })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["analysis"]["calories"], 520);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(ScriptedGateway::replying(GOOD_REPLY));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}
