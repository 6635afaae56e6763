// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every failure the analysis endpoint can produce maps onto a small,
//! stable taxonomy. Client-facing messages never contain upstream
//! detail; the full detail is logged server-side and can be correlated
//! via the request identifier attached to each response.

use crate::middleware::request_id::RequestId;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Origin not allowed")]
    OriginForbidden,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upstream AI gateway returned 429. `retry_after` carries the
    /// upstream reset value verbatim when one was supplied.
    #[error("Upstream rate limit hit")]
    RateLimited { retry_after: Option<String> },

    /// Upstream AI gateway returned 402.
    #[error("Upstream credits exhausted")]
    CreditsExhausted,

    /// The gateway API key is not configured.
    #[error("AI gateway is not configured")]
    GatewayNotConfigured,

    /// Any other non-2xx from the upstream gateway. The string is the
    /// upstream detail, logged but never forwarded.
    #[error("AI gateway error: {0}")]
    UpstreamFailure(String),

    /// The model's text could not be parsed into an analysis object.
    #[error("Unparseable model output: {0}")]
    ResponseParse(String),

    /// The model returned JSON but without the required fields.
    #[error("Incomplete analysis from model")]
    IncompleteAnalysis,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON failure body: `{ success: false, error, requestId }`.
#[derive(Serialize)]
struct FailureResponse {
    success: bool,
    error: String,
    #[serde(rename = "requestId")]
    request_id: String,
}

impl AppError {
    /// Client-facing message for this error. Generic for anything that
    /// could leak internal detail.
    pub fn client_message(&self) -> &'static str {
        match self {
            AppError::OriginForbidden => "Origin not allowed",
            AppError::BadRequest(_) => "Invalid request",
            AppError::RateLimited { .. } => {
                "Too many requests. Please wait a moment and try again."
            }
            AppError::CreditsExhausted => "AI credits exhausted. Please add credits to continue.",
            AppError::GatewayNotConfigured => "Service configuration error",
            AppError::UpstreamFailure(_) => "AI processing error",
            AppError::ResponseParse(_) => "Error processing AI response",
            AppError::IncompleteAnalysis => "Incomplete analysis from AI service",
            AppError::Internal(_) => "Internal server error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::OriginForbidden => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::CreditsExhausted => StatusCode::PAYMENT_REQUIRED,
            AppError::GatewayNotConfigured
            | AppError::UpstreamFailure(_)
            | AppError::ResponseParse(_)
            | AppError::IncompleteAnalysis
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the HTTP response for this error, tagged with the request
    /// correlation identifier.
    pub fn into_response_with_id(self, request_id: &RequestId) -> Response {
        let status = self.status_code();

        // Server-side detail for the 500-class errors; the client only
        // ever sees the generic message.
        match &self {
            AppError::UpstreamFailure(detail) => {
                tracing::error!(request_id = %request_id, detail = %detail, "AI gateway failure");
            }
            AppError::ResponseParse(detail) => {
                tracing::error!(request_id = %request_id, detail = %detail, "Model output parse failure");
            }
            AppError::IncompleteAnalysis => {
                tracing::error!(request_id = %request_id, "Model output missing required fields");
            }
            AppError::GatewayNotConfigured => {
                tracing::error!(request_id = %request_id, "AI gateway API key is not configured");
            }
            AppError::Internal(err) => {
                tracing::error!(request_id = %request_id, error = %err, "Internal server error");
            }
            _ => {}
        }

        let message = match &self {
            // Validation messages are specific and safe to forward.
            AppError::BadRequest(msg) => msg.clone(),
            other => other.client_message().to_string(),
        };

        let body = FailureResponse {
            success: false,
            error: message,
            request_id: request_id.to_string(),
        };

        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited {
            retry_after: Some(reset),
        } = &self
        {
            if let Ok(value) = HeaderValue::from_str(reset) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Result type alias for fallible service paths.
pub type Result<T> = std::result::Result<T, AppError>;
