// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transport to the analysis endpoint.
//!
//! The pipeline never talks HTTP directly; it goes through
//! [`AnalysisTransport`] so tests can script the endpoint. The real
//! implementation posts the data URI and maps the failure envelope to
//! a single user-facing message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::errors::ClientError;
use crate::models::MealAnalysis;

/// Request body for `POST /analyze`.
#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    #[serde(rename = "imageBase64")]
    image_base64: &'a str,
}

/// Response envelope, success or failure. `analysis` is kept as a raw
/// value: an out-of-range estimate must still reach the review step,
/// so deserialization stays permissive here.
#[derive(Debug, Deserialize)]
struct AnalyzeEnvelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    analysis: Option<MealAnalysis>,
}

/// The analysis endpoint, as the capture pipeline sees it.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Submit one image for analysis.
    async fn analyze(&self, image_data_uri: &str) -> Result<MealAnalysis, ClientError>;
}

/// HTTP transport for the hosted analysis endpoint.
pub struct HttpAnalysisTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpAnalysisTransport {
    /// `endpoint` is the full URL of the analyze route.
    pub fn new(endpoint: impl Into<String>) -> HttpAnalysisTransport {
        HttpAnalysisTransport {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl AnalysisTransport for HttpAnalysisTransport {
    async fn analyze(&self, image_data_uri: &str) -> Result<MealAnalysis, ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&AnalyzeRequest {
                image_base64: image_data_uri,
            })
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let envelope: AnalyzeEnvelope = response
            .json()
            .await
            .map_err(|e| ClientError::Network(format!("unreadable response: {e}")))?;

        if !envelope.success || !status.is_success() {
            let message = envelope
                .error
                .unwrap_or_else(|| "Could not analyze the image. Try again.".to_string());
            tracing::warn!(status = %status, message = %message, "analysis endpoint reported failure");
            return Err(ClientError::Analysis(message));
        }

        envelope.analysis.ok_or_else(|| {
            ClientError::Analysis("Could not analyze the image. Try again.".to_string())
        })
    }
}
