// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AI gateway client for vision-based meal analysis.
//!
//! Handles:
//! - Chat-completion requests with an inline image
//! - Quota header capture for relay to callers
//! - Rate limit and credit exhaustion detection

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;

use crate::config::Config;
use crate::error::AppError;
use crate::models::RateLimitInfo;

/// Completion budget. The reply is a small JSON object; anything
/// longer is the model rambling.
const MAX_COMPLETION_TOKENS: u32 = 500;

const SYSTEM_PROMPT: &str = r#"You are an expert nutritionist specializing in food analysis.
Analyze the meal image and return ONLY a valid JSON object (no markdown, no ```json) with this exact structure:
{
  "food_name": "name of the main dish",
  "calories": estimated calories as a whole number,
  "protein": grams of protein (decimal),
  "carbs": grams of carbohydrates (decimal),
  "fats": grams of fat (decimal),
  "portion_size": "portion description (e.g. 350g, 1 medium plate)",
  "meal_type": "breakfast, lunch, dinner or snack",
  "confidence": "high, medium or low"
}"#;

const USER_PROMPT: &str = "Analyze this meal and provide the estimated nutritional values.";

/// Raw model output plus the quota headers that came with it.
#[derive(Debug, Clone)]
pub struct GatewayReply {
    pub content: String,
    pub rate_limit: RateLimitInfo,
}

/// Vision-capable analysis backend. The production implementation is
/// [`AiGatewayClient`]; tests substitute a scripted one.
#[async_trait]
pub trait VisionGateway: Send + Sync {
    /// Submit an image (as a data URI) and get the model's raw text
    /// reply back.
    async fn analyze_image(&self, image_data_uri: &str) -> Result<GatewayReply, AppError>;
}

/// AI gateway client.
#[derive(Clone)]
pub struct AiGatewayClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl AiGatewayClient {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            model,
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.gateway_url.clone(),
            config.gateway_model.clone(),
            config.gateway_api_key.clone(),
        )
    }

    /// Map a non-2xx gateway response to the matching error.
    async fn normalize_failure(&self, response: reqwest::Response) -> AppError {
        let status = response.status();

        // Rate limit - relay the upstream Retry-After verbatim
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            tracing::warn!("AI gateway rate limit hit (429)");
            return AppError::RateLimited { retry_after };
        }

        // Workspace out of credits
        if status.as_u16() == 402 {
            tracing::warn!("AI gateway credits exhausted (402)");
            return AppError::CreditsExhausted;
        }

        let body = response.text().await.unwrap_or_default();
        AppError::UpstreamFailure(format!("HTTP {}: {}", status, body))
    }
}

#[async_trait]
impl VisionGateway for AiGatewayClient {
    async fn analyze_image(&self, image_data_uri: &str) -> Result<GatewayReply, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("AI gateway API key is not configured");
            return Err(AppError::GatewayNotConfigured);
        };

        tracing::debug!(model = %self.model, "requesting meal analysis from AI gateway");

        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT,
                },
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "text",
                            "text": USER_PROMPT,
                        },
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": image_data_uri
                            }
                        }
                    ]
                }
            ],
            "max_tokens": MAX_COMPLETION_TOKENS,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(self.normalize_failure(response).await);
        }

        // Headers first; reading the body consumes the response.
        let rate_limit = read_rate_limit_headers(response.headers());

        let reply: ChatCompletionReply = response
            .json()
            .await
            .map_err(|e| AppError::ResponseParse(format!("gateway reply was not valid JSON: {}", e)))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::ResponseParse("gateway reply had no message content".to_string())
            })?;

        Ok(GatewayReply {
            content,
            rate_limit,
        })
    }
}

fn read_rate_limit_headers(headers: &header::HeaderMap) -> RateLimitInfo {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    RateLimitInfo {
        limit: read("x-ratelimit-limit"),
        remaining: read("x-ratelimit-remaining"),
        reset: read("x-ratelimit-reset"),
    }
}

/// Chat completion reply, trimmed to the fields we read.
#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
