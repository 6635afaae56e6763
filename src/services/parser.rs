// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Parse the model's text reply into a [`MealAnalysis`].
//!
//! Models are told to reply with bare JSON but routinely wrap it in
//! Markdown fences anyway, so fences are stripped first. A reply
//! missing the two required fields (`food_name`, `calories`) is
//! rejected outright; optional numeric fields fall back to zero and
//! descriptive fields to fixed defaults.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;
use crate::models::{Confidence, MealAnalysis, MealType};

const DEFAULT_PORTION: &str = "average portion";

static INT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?\d+").unwrap_or_else(|e| panic!("invalid int regex: {e}"))
});

static FLOAT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)").unwrap_or_else(|e| panic!("invalid float regex: {e}"))
});

/// Remove Markdown code fences the model may have wrapped around its
/// JSON reply.
fn strip_fences(content: &str) -> String {
    let trimmed = content.trim();
    let cleaned = if trimmed.starts_with("```json") {
        trimmed
            .replace("```json\n", "")
            .replace("```json", "")
            .replace("```\n", "")
            .replace("```", "")
    } else if trimmed.starts_with("```") {
        trimmed.replace("```\n", "").replace("```", "")
    } else {
        trimmed.to_string()
    };
    cleaned.trim().to_string()
}

/// Leading-integer parse: accepts a bare number or a numeric prefix
/// like "350 kcal". Fractional model outputs are truncated.
fn coerce_int(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => {
            let f = n.as_f64()?;
            Some(f.trunc().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
        }
        serde_json::Value::String(s) => {
            let m = INT_PREFIX_RE.find(s.trim())?;
            m.as_str().parse::<i64>().ok().map(|n| {
                n.clamp(i32::MIN as i64, i32::MAX as i64) as i32
            })
        }
        _ => None,
    }
}

/// Leading-float parse: accepts a bare number or a prefix like "12.5g".
fn coerce_float(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let m = FLOAT_PREFIX_RE.find(s.trim())?;
            m.as_str().parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Parse and coerce the model's reply into a structurally complete
/// analysis.
pub fn parse_model_output(content: &str) -> Result<MealAnalysis, AppError> {
    let cleaned = strip_fences(content);

    let value: serde_json::Value = serde_json::from_str(&cleaned)
        .map_err(|e| AppError::ResponseParse(format!("model output was not valid JSON: {}", e)))?;

    let food_name = match value.get("food_name") {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Err(AppError::IncompleteAnalysis),
    };

    // calories is required; zero is a legitimate present value.
    let calories = match value.get("calories") {
        None | Some(serde_json::Value::Null) => return Err(AppError::IncompleteAnalysis),
        Some(v) => coerce_int(v).ok_or(AppError::IncompleteAnalysis)?,
    };

    let protein = value.get("protein").and_then(coerce_float).unwrap_or(0.0);
    let carbs = value.get("carbs").and_then(coerce_float).unwrap_or(0.0);
    let fats = value.get("fats").and_then(coerce_float).unwrap_or(0.0);

    let portion_size = match value.get("portion_size") {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => DEFAULT_PORTION.to_string(),
    };

    let meal_type = value
        .get("meal_type")
        .and_then(|v| v.as_str())
        .and_then(MealType::parse)
        .unwrap_or(MealType::Snack);

    let confidence = value
        .get("confidence")
        .and_then(|v| v.as_str())
        .and_then(Confidence::parse)
        .unwrap_or(Confidence::Medium);

    Ok(MealAnalysis {
        food_name,
        calories,
        protein,
        carbs,
        fats,
        portion_size,
        meal_type,
        confidence,
    })
}
