// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Suggested daily goals from body stats.
//!
//! BMR by Mifflin-St Jeor, scaled by an activity multiplier, shifted
//! by the weight goal, then split 30/40/30 across protein/carbs/fat
//! at 4/4/9 kcal per gram. Results are clamped into the valid goal
//! ranges so the suggestion always passes the goals validation.

use crate::models::GoalsInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightGoal {
    Lose,
    Maintain,
    Gain,
}

impl WeightGoal {
    /// Daily calorie adjustment.
    pub fn adjustment(&self) -> f64 {
        match self {
            WeightGoal::Lose => -500.0,
            WeightGoal::Maintain => 0.0,
            WeightGoal::Gain => 500.0,
        }
    }
}

/// Body stats the calculator needs.
#[derive(Debug, Clone, Copy)]
pub struct BodyProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    pub sex: Sex,
}

/// Mifflin-St Jeor basal metabolic rate.
pub fn bmr(profile: &BodyProfile) -> f64 {
    let base =
        10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * profile.age_years as f64;
    match profile.sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

fn clamp(value: f64, min: i32, max: i32) -> i32 {
    (value.round() as i32).clamp(min, max)
}

/// Suggested goals for a profile, activity level, and weight goal.
/// Always within the valid goal ranges.
pub fn calculate_goals(
    profile: &BodyProfile,
    activity: ActivityLevel,
    goal: WeightGoal,
) -> GoalsInput {
    let tdee = bmr(profile) * activity.multiplier();
    let calories = tdee + goal.adjustment();

    GoalsInput {
        daily_calories: clamp(calories, 1000, 5000),
        target_protein: clamp(calories * 0.30 / 4.0, 50, 400),
        target_carbs: clamp(calories * 0.40 / 4.0, 50, 800),
        target_fats: clamp(calories * 0.30 / 9.0, 20, 300),
    }
}
