//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup and kept in memory. The gateway
//! API key is deliberately optional: the service still starts without
//! it and reports a configuration error per request instead, so a
//! missing secret never takes the whole deployment down.

use std::env;

/// Default upstream AI gateway (vision-capable chat completions).
pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev";

/// Default vision model requested from the gateway.
pub const DEFAULT_GATEWAY_MODEL: &str = "google/gemini-2.5-flash";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Extra production origin allowed to call the analysis endpoint,
    /// on top of the fixed development and platform origins.
    pub allowed_origin: Option<String>,
    /// Base URL of the upstream AI gateway
    pub gateway_url: String,
    /// Model identifier sent to the gateway
    pub gateway_model: String,
    /// Gateway API key. `None` means analysis requests fail with a
    /// configuration error, but the server still serves traffic.
    pub gateway_api_key: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            allowed_origin: None,
            gateway_url: "http://localhost:9000".to_string(),
            gateway_model: DEFAULT_GATEWAY_MODEL.to_string(),
            gateway_api_key: Some("test_gateway_key".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let allowed_origin = match env::var("ALLOWED_ORIGIN") {
            Ok(origin) => {
                let origin = origin.trim().trim_end_matches('/').to_string();
                if !origin.starts_with("http://") && !origin.starts_with("https://") {
                    return Err(ConfigError::Invalid("ALLOWED_ORIGIN"));
                }
                Some(origin)
            }
            Err(_) => None,
        };

        Ok(Self {
            port,
            allowed_origin,
            gateway_url: env::var("AI_GATEWAY_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
            gateway_model: env::var("AI_GATEWAY_MODEL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_MODEL.to_string()),
            gateway_api_key: env::var("AI_GATEWAY_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
