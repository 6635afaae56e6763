// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request payload validation for the analyze endpoint.
//!
//! Everything here runs before any upstream call, so malformed input
//! never costs gateway credits.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

/// Upper bound on the base64 text itself, not the decoded image.
pub const MAX_BASE64_LEN: usize = 10 * 1024 * 1024;

static DATA_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/(jpeg|jpg|png|gif|webp|bmp);base64,")
        .unwrap_or_else(|e| panic!("invalid data URI regex: {e}"))
});

static BASE64_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+/]+={0,2}$")
        .unwrap_or_else(|e| panic!("invalid base64 regex: {e}"))
});

/// Validate the `imageBase64` field of an analyze request and return
/// the data URI to forward upstream.
///
/// Checks run in order: presence, type, size, data URI prefix, base64
/// alphabet. The first failure wins and maps to a 400 with a message
/// naming the problem.
pub fn validate_image_payload(body: &serde_json::Value) -> Result<String, AppError> {
    let field = body.get("imageBase64");

    let value = match field {
        None | Some(serde_json::Value::Null) => {
            return Err(AppError::BadRequest("Image data is required".to_string()));
        }
        Some(serde_json::Value::String(s)) => s,
        Some(_) => {
            return Err(AppError::BadRequest(
                "Image data must be a string".to_string(),
            ));
        }
    };

    if value.len() > MAX_BASE64_LEN {
        return Err(AppError::BadRequest(
            "Image data is too large (max 10MB)".to_string(),
        ));
    }

    let Some(prefix) = DATA_URI_RE.find(value) else {
        return Err(AppError::BadRequest(
            "Invalid image format. Supported formats: JPEG, PNG, GIF, WebP, BMP".to_string(),
        ));
    };

    let encoded = &value[prefix.end()..];
    if encoded.is_empty() || !BASE64_RE.is_match(encoded) {
        return Err(AppError::BadRequest(
            "Invalid base64 image data".to_string(),
        ));
    }

    Ok(value.clone())
}
