// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Origin allow-list enforcement and CORS responses.
//!
//! The allow-list holds three entries: the fixed development origin,
//! the fixed platform origin, and the configurable production origin.
//! Preflight requests are always answered; non-preflight requests
//! bearing a disallowed `Origin` are refused with 403 before any
//! further processing. Requests without an `Origin` header (curl,
//! server-to-server) are not gated here.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;
use crate::AppState;

/// Local Vite dev server.
pub const DEV_ORIGIN: &str = "http://localhost:5173";
/// Hosted app origin.
pub const PLATFORM_ORIGIN: &str = "https://app.caltrack.dev";

const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
const ALLOWED_METHODS: &str = "POST, OPTIONS";

fn is_allowed(origin: &str, config: &Config) -> bool {
    origin == DEV_ORIGIN
        || origin == PLATFORM_ORIGIN
        || config.allowed_origin.as_deref() == Some(origin)
}

/// Origin whose grant is used when a preflight arrives from an
/// unknown (or absent) origin.
fn default_origin(config: &Config) -> String {
    config
        .allowed_origin
        .clone()
        .unwrap_or_else(|| PLATFORM_ORIGIN.to_string())
}

fn preflight_response(grant: &str) -> Response {
    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();

    if let Ok(value) = HeaderValue::from_str(grant) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(header::VARY, HeaderValue::from_static("origin"));

    response
}

/// Enforce the origin allow-list and attach CORS headers.
pub async fn enforce_origin(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if req.method() == Method::OPTIONS {
        let grant = match origin.as_deref() {
            Some(o) if is_allowed(o, &state.config) => o.to_string(),
            _ => default_origin(&state.config),
        };
        return preflight_response(&grant);
    }

    if let Some(o) = origin.as_deref() {
        if !is_allowed(o, &state.config) {
            tracing::warn!(origin = %o, "request from disallowed origin refused");
            let request_id = req
                .extensions()
                .get::<RequestId>()
                .cloned()
                .unwrap_or_default();
            return AppError::OriginForbidden.into_response_with_id(&request_id);
        }
    }

    let grant = origin;
    let mut response = next.run(req).await;

    if let Some(o) = grant {
        if let Ok(value) = HeaderValue::from_str(&o) {
            let headers = response.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
            headers.insert(header::VARY, HeaderValue::from_static("origin"));
        }
    }

    response
}
