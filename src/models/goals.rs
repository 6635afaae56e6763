// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily nutrition targets.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Effective daily targets for a user. A user who has never saved
/// goals gets the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGoals {
    pub daily_calories: i32,
    pub target_protein: i32,
    pub target_carbs: i32,
    pub target_fats: i32,
}

impl Default for UserGoals {
    fn default() -> UserGoals {
        UserGoals {
            daily_calories: 2000,
            target_protein: 150,
            target_carbs: 250,
            target_fats: 67,
        }
    }
}

/// Goal values as entered in the editor, pre-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GoalsInput {
    #[validate(range(
        min = 1000,
        max = 5000,
        message = "Daily calories must be between 1000 and 5000"
    ))]
    pub daily_calories: i32,

    #[validate(range(
        min = 50,
        max = 400,
        message = "Protein target must be between 50 and 400g"
    ))]
    pub target_protein: i32,

    #[validate(range(
        min = 50,
        max = 800,
        message = "Carbs target must be between 50 and 800g"
    ))]
    pub target_carbs: i32,

    #[validate(range(
        min = 20,
        max = 300,
        message = "Fats target must be between 20 and 300g"
    ))]
    pub target_fats: i32,
}

impl From<GoalsInput> for UserGoals {
    fn from(input: GoalsInput) -> UserGoals {
        UserGoals {
            daily_calories: input.daily_calories,
            target_protein: input.target_protein,
            target_carbs: input.target_carbs,
            target_fats: input.target_fats,
        }
    }
}

impl From<UserGoals> for GoalsInput {
    fn from(goals: UserGoals) -> GoalsInput {
        GoalsInput {
            daily_calories: goals.daily_calories,
            target_protein: goals.target_protein,
            target_carbs: goals.target_carbs,
            target_fats: goals.target_fats,
        }
    }
}
