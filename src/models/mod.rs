// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod analysis;
pub mod goals;
pub mod meal;

pub use analysis::{Confidence, MealAnalysis, MealType, RateLimitInfo};
pub use goals::{GoalsInput, UserGoals};
pub use meal::{Meal, MealDraft, TimeRange, TEMP_ID_PREFIX};
