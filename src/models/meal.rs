// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted meal records and the editable draft that precedes them.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::analysis::{MealAnalysis, MealType};

/// Prefix marking a placeholder id for an optimistically inserted meal.
/// Replaced by the store-assigned id on the next refetch.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// A logged meal as it exists in the store (or optimistically in the
/// client cache while a create is in flight).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub user_id: String,
    pub food_name: String,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub meal_type: MealType,
    pub portion_size: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Meal {
    /// Placeholder record shown in the UI while the real create runs.
    pub fn optimistic(user_id: &str, draft: &MealDraft, image_url: Option<String>) -> Meal {
        Meal {
            id: format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4()),
            user_id: user_id.to_string(),
            food_name: draft.food_name.clone(),
            calories: draft.calories,
            protein: draft.protein,
            carbs: draft.carbs,
            fats: draft.fats,
            meal_type: draft.meal_type,
            portion_size: draft.portion_size.clone(),
            image_url,
            created_at: Utc::now(),
        }
    }

    pub fn is_optimistic(&self) -> bool {
        self.id.starts_with(TEMP_ID_PREFIX)
    }
}

/// User-editable meal fields, pre-validation. Produced from an AI
/// analysis or built by hand for a manual entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MealDraft {
    #[validate(length(
        min = 2,
        max = 100,
        message = "Food name must be between 2 and 100 characters"
    ))]
    pub food_name: String,

    #[validate(range(min = 0, max = 10000, message = "Calories must be between 0 and 10000"))]
    pub calories: i32,

    #[validate(range(min = 0.0, max = 500.0, message = "Protein must be between 0 and 500g"))]
    pub protein: f64,

    #[validate(range(min = 0.0, max = 1000.0, message = "Carbs must be between 0 and 1000g"))]
    pub carbs: f64,

    #[validate(range(min = 0.0, max = 500.0, message = "Fats must be between 0 and 500g"))]
    pub fats: f64,

    pub meal_type: MealType,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Portion size must be between 1 and 100 characters"
    ))]
    pub portion_size: Option<String>,
}

impl From<MealAnalysis> for MealDraft {
    fn from(analysis: MealAnalysis) -> MealDraft {
        MealDraft {
            food_name: analysis.food_name,
            calories: analysis.calories,
            protein: analysis.protein,
            carbs: analysis.carbs,
            fats: analysis.fats,
            meal_type: analysis.meal_type,
            portion_size: Some(analysis.portion_size),
        }
    }
}

/// Query window for meal listings. All ranges resolve to a half-open
/// UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeRange {
    /// The current UTC day.
    Today,
    /// A single calendar day.
    Day(NaiveDate),
    /// The Monday-start week containing the given date.
    Week(NaiveDate),
    /// The calendar month containing the given date.
    Month(NaiveDate),
    /// An explicit day span, inclusive of both endpoint days.
    Custom { start: NaiveDate, end: NaiveDate },
}

impl TimeRange {
    /// Resolve to concrete UTC instants. `now` pins "today" so callers
    /// (and tests) control the clock.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let day_span = |date: NaiveDate| {
            let start = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
            let end = start + chrono::Duration::days(1);
            (start, end)
        };

        match self {
            TimeRange::Today => day_span(now.date_naive()),
            TimeRange::Day(date) => day_span(*date),
            TimeRange::Week(date) => {
                let monday = date.week(Weekday::Mon).first_day();
                let start = monday.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
                (start, start + chrono::Duration::days(7))
            }
            TimeRange::Month(date) => {
                let first = date.with_day(1).unwrap_or(*date);
                let start = first.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
                let next = first
                    .checked_add_months(Months::new(1))
                    .unwrap_or(first)
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or_default()
                    .and_utc();
                (start, next)
            }
            TimeRange::Custom { start, end } => {
                let (lo, _) = day_span(*start);
                let (_, hi) = day_span(*end);
                (lo, hi)
            }
        }
    }

    /// Stable string for cache keying.
    pub fn cache_key(&self) -> String {
        match self {
            TimeRange::Today => "today".to_string(),
            TimeRange::Day(date) => format!("day:{date}"),
            TimeRange::Week(date) => format!("week:{}", date.week(Weekday::Mon).first_day()),
            TimeRange::Month(date) => {
                format!("month:{:04}-{:02}", date.year(), date.month())
            }
            TimeRange::Custom { start, end } => format!("custom:{start}:{end}"),
        }
    }
}
