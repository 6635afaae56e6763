// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily totals, goal progress, and meal-type breakdown.
//!
//! Pure functions over an already-fetched meal list. Progress is
//! capped at 100 for display; the raw ratio is not interesting past
//! the goal.

use crate::models::{Meal, MealType, UserGoals};

/// Nutrient totals over a meal list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyTotals {
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

pub fn totals(meals: &[Meal]) -> DailyTotals {
    meals.iter().fold(DailyTotals::default(), |acc, meal| DailyTotals {
        calories: acc.calories + meal.calories,
        protein: acc.protein + meal.protein,
        carbs: acc.carbs + meal.carbs,
        fats: acc.fats + meal.fats,
    })
}

/// Percent-of-goal per nutrient, each capped at 100.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GoalProgress {
    pub calories_pct: f64,
    pub protein_pct: f64,
    pub carbs_pct: f64,
    pub fats_pct: f64,
}

pub fn progress(totals: &DailyTotals, goals: &UserGoals) -> GoalProgress {
    let pct = |value: f64, target: f64| {
        if target <= 0.0 {
            0.0
        } else {
            (value / target * 100.0).min(100.0)
        }
    };

    GoalProgress {
        calories_pct: pct(totals.calories as f64, goals.daily_calories as f64),
        protein_pct: pct(totals.protein, goals.target_protein as f64),
        carbs_pct: pct(totals.carbs, goals.target_carbs as f64),
        fats_pct: pct(totals.fats, goals.target_fats as f64),
    }
}

/// One meal type's calorie share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MealTypeShare {
    pub meal_type: MealType,
    pub calories: i32,
    /// Share of the day's calories, 0–100. Zero when nothing was
    /// logged at all.
    pub percent: f64,
}

/// Calories per meal type with share-of-total, in the fixed
/// breakfast/lunch/dinner/snack display order. Types with no meals
/// appear with zeroes.
pub fn meal_type_breakdown(meals: &[Meal]) -> Vec<MealTypeShare> {
    let total: i32 = meals.iter().map(|meal| meal.calories).sum();

    MealType::ALL
        .iter()
        .map(|&meal_type| {
            let calories: i32 = meals
                .iter()
                .filter(|meal| meal.meal_type == meal_type)
                .map(|meal| meal.calories)
                .sum();
            let percent = if total > 0 {
                calories as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            MealTypeShare {
                meal_type,
                calories,
                percent,
            }
        })
        .collect()
}
