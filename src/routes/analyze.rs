// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The meal analysis route.
//!
//! Thin orchestration only: payload checks, the gateway call, and
//! reply parsing all live in `services`. Errors never leave here as
//! raw detail — every failure goes through the error taxonomy with
//! the request's correlation id attached.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::RequestId;
use crate::models::{MealAnalysis, RateLimitInfo};
use crate::services::{parse_model_output, validate_image_payload};
use crate::AppState;

/// Analysis routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/analyze", post(analyze_meal))
}

/// Success envelope for a completed analysis.
#[derive(Serialize)]
struct AnalysisResponse {
    success: bool,
    #[serde(rename = "requestId")]
    request_id: String,
    analysis: MealAnalysis,
}

/// Analyze a meal photo (POST /analyze).
async fn analyze_meal(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    match handle(&state, payload).await {
        Ok((analysis, rate_limit)) => success_response(analysis, rate_limit, &request_id),
        Err(err) => err.into_response_with_id(&request_id),
    }
}

async fn handle(
    state: &AppState,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(MealAnalysis, RateLimitInfo), AppError> {
    let Json(body) =
        payload.map_err(|_| AppError::BadRequest("Request body must be valid JSON".to_string()))?;

    let image_data_uri = validate_image_payload(&body)?;

    let reply = state.gateway.analyze_image(&image_data_uri).await?;
    let analysis = parse_model_output(&reply.content)?;

    tracing::info!(food_name = %analysis.food_name, "meal analysis successful");

    Ok((analysis, reply.rate_limit))
}

/// Build the 200 response, relaying upstream quota headers when the
/// gateway supplied them.
fn success_response(
    analysis: MealAnalysis,
    rate_limit: RateLimitInfo,
    request_id: &RequestId,
) -> Response {
    let mut response = Json(AnalysisResponse {
        success: true,
        request_id: request_id.to_string(),
        analysis,
    })
    .into_response();

    let headers = response.headers_mut();
    let relayed = [
        (HeaderName::from_static("x-ratelimit-limit"), &rate_limit.limit),
        (
            HeaderName::from_static("x-ratelimit-remaining"),
            &rate_limit.remaining,
        ),
        (HeaderName::from_static("x-ratelimit-reset"), &rate_limit.reset),
    ];
    for (name, value) in relayed {
        if let Some(v) = value {
            if let Ok(header_value) = HeaderValue::from_str(v) {
                headers.insert(name, header_value);
            }
        }
    }

    response
}
