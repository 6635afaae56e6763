// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use caltrack::config::Config;
use caltrack::error::AppError;
use caltrack::models::RateLimitInfo;
use caltrack::routes::create_router;
use caltrack::services::{GatewayReply, VisionGateway};
use caltrack::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

/// A fixed development origin the router always allows.
#[allow(dead_code)]
pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// A complete, in-range model reply.
#[allow(dead_code)]
pub const GOOD_REPLY: &str = r#"{
    "food_name": "Grilled salmon with rice",
    "calories": 520,
    "protein": 34.5,
    "carbs": 45.0,
    "fats": 18.2,
    "portion_size": "1 medium plate",
    "meal_type": "dinner",
    "confidence": "high"
}"#;

type GatewayScript = Box<dyn Fn() -> Result<GatewayReply, AppError> + Send + Sync>;

/// Gateway double that replays a scripted outcome and counts calls.
#[allow(dead_code)]
pub struct ScriptedGateway {
    calls: AtomicUsize,
    script: GatewayScript,
}

impl ScriptedGateway {
    #[allow(dead_code)]
    pub fn replying(content: &str) -> Arc<ScriptedGateway> {
        Self::replying_with_headers(content, RateLimitInfo::default())
    }

    #[allow(dead_code)]
    pub fn replying_with_headers(content: &str, rate_limit: RateLimitInfo) -> Arc<ScriptedGateway> {
        let content = content.to_string();
        Arc::new(ScriptedGateway {
            calls: AtomicUsize::new(0),
            script: Box::new(move || {
                Ok(GatewayReply {
                    content: content.clone(),
                    rate_limit: rate_limit.clone(),
                })
            }),
        })
    }

    #[allow(dead_code)]
    pub fn failing(make_error: impl Fn() -> AppError + Send + Sync + 'static) -> Arc<ScriptedGateway> {
        Arc::new(ScriptedGateway {
            calls: AtomicUsize::new(0),
            script: Box::new(move || Err(make_error())),
        })
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VisionGateway for ScriptedGateway {
    async fn analyze_image(&self, _image_data_uri: &str) -> Result<GatewayReply, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)()
    }
}

/// Build the full router with a scripted gateway and test config.
#[allow(dead_code)]
pub fn create_test_app(gateway: Arc<ScriptedGateway>) -> Router {
    let state = Arc::new(AppState {
        config: Config::default(),
        gateway,
    });
    create_router(state)
}

/// POST /analyze with a JSON body and the given origin.
#[allow(dead_code)]
pub async fn post_analyze(
    app: Router,
    origin: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(header::ORIGIN, origin)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the standard failure envelope and return its error message.
#[allow(dead_code)]
pub async fn assert_failure(response: Response<Body>, status: StatusCode) -> String {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["success"], serde_json::json!(false));
    assert!(
        body["requestId"].as_str().is_some_and(|id| !id.is_empty()),
        "failure body must carry a requestId: {body}"
    );
    body["error"].as_str().unwrap().to_string()
}
