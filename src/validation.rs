// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field validation for meal and goal editors.
//!
//! Derive-based rules live on the model structs; this module merges
//! their output into per-field messages and layers on the checks the
//! derive macro cannot express (trimmed length, decimal precision).
//! The [`Validated`] wrapper is the proof token stores require: it can
//! only be built here, after every check has passed.

use std::collections::BTreeMap;

use validator::Validate;

use crate::models::{GoalsInput, MealDraft};

/// Per-field validation messages, first failure per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> FieldErrors {
        FieldErrors(BTreeMap::new())
    }

    /// Keep the first message recorded for a field.
    pub(crate) fn record(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_insert(message);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn take(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Editable fields of a meal draft, for single-field revalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealField {
    FoodName,
    Calories,
    Protein,
    Carbs,
    Fats,
    MealType,
    PortionSize,
}

impl MealField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealField::FoodName => "food_name",
            MealField::Calories => "calories",
            MealField::Protein => "protein",
            MealField::Carbs => "carbs",
            MealField::Fats => "fats",
            MealField::MealType => "meal_type",
            MealField::PortionSize => "portion_size",
        }
    }
}

/// A value that has passed every validation rule. The inner value is
/// only constructible in this module, so holding one is proof of
/// validity.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T>(T);

impl<T> Validated<T> {
    pub fn get(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

fn merge_derive_errors(errors: &mut FieldErrors, result: Result<(), validator::ValidationErrors>) {
    let Err(derive_errors) = result else {
        return;
    };
    for (field, field_failures) in derive_errors.field_errors() {
        if let Some(first) = field_failures.first() {
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| first.code.to_string());
            errors.record(&field.to_string(), message);
        }
    }
}

fn has_one_decimal_at_most(value: f64) -> bool {
    let scaled = value * 10.0;
    (scaled - scaled.round()).abs() < 1e-6
}

/// Run every meal rule and collect per-field messages. Empty result
/// means the draft is valid.
pub fn check_meal(draft: &MealDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    merge_derive_errors(&mut errors, draft.validate());

    // Length counts the trimmed name, so surrounding whitespace cannot
    // sneak a one-character name through.
    if errors.get("food_name").is_none() && draft.food_name.trim().chars().count() < 2 {
        errors.record(
            "food_name",
            "Food name must be between 2 and 100 characters".to_string(),
        );
    }

    let decimal_checks = [
        ("protein", draft.protein, "Protein must have at most one decimal place"),
        ("carbs", draft.carbs, "Carbs must have at most one decimal place"),
        ("fats", draft.fats, "Fats must have at most one decimal place"),
    ];
    for (field, value, message) in decimal_checks {
        if errors.get(field).is_none() && !has_one_decimal_at_most(value) {
            errors.record(field, message.to_string());
        }
    }

    errors
}

/// Message for a single field, if that field is currently invalid.
pub fn check_meal_field(draft: &MealDraft, field: MealField) -> Option<String> {
    check_meal(draft).take(field.as_str())
}

/// Validate a full draft, producing the proof token stores accept.
/// The food name is trimmed on the way through.
pub fn validate_meal(draft: MealDraft) -> Result<Validated<MealDraft>, FieldErrors> {
    let errors = check_meal(&draft);
    if !errors.is_empty() {
        return Err(errors);
    }
    let mut draft = draft;
    draft.food_name = draft.food_name.trim().to_string();
    Ok(Validated(draft))
}

pub fn check_goals(input: &GoalsInput) -> FieldErrors {
    let mut errors = FieldErrors::new();
    merge_derive_errors(&mut errors, input.validate());
    errors
}

pub fn validate_goals(input: GoalsInput) -> Result<Validated<GoalsInput>, FieldErrors> {
    let errors = check_goals(&input);
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Validated(input))
}
