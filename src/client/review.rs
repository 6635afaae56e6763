// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Editable review state between analysis and save.
//!
//! An AI estimate is advisory: it always lands here first, even when
//! some fields are out of range. Each edit revalidates only the field
//! that changed; the save revalidates the whole draft and refuses to
//! produce a [`Validated`] token while any field is wrong.

use crate::models::{MealAnalysis, MealDraft, MealType};
use crate::validation::{
    check_meal, check_meal_field, validate_meal, FieldErrors, MealField, Validated,
};

/// Warning shown when an estimate arrives with out-of-range fields.
pub const OUT_OF_RANGE_WARNING: &str = "Some values may be out of range. Review before saving.";

/// A candidate meal under user review.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    draft: MealDraft,
    errors: FieldErrors,
    /// Set when the initial estimate failed validation.
    from_flagged_analysis: bool,
}

impl ReviewSession {
    /// Start a review from an AI estimate. Validation failures flag
    /// fields but never reject the candidate.
    pub fn from_analysis(analysis: MealAnalysis) -> ReviewSession {
        let draft = MealDraft::from(analysis);
        let errors = check_meal(&draft);
        let from_flagged_analysis = !errors.is_empty();
        if from_flagged_analysis {
            tracing::warn!(
                fields = errors.len(),
                "analysis arrived with out-of-range fields"
            );
        }
        ReviewSession {
            draft,
            errors,
            from_flagged_analysis,
        }
    }

    /// Start a review for a manual entry.
    pub fn manual(draft: MealDraft) -> ReviewSession {
        let errors = check_meal(&draft);
        ReviewSession {
            draft,
            errors,
            from_flagged_analysis: false,
        }
    }

    pub fn draft(&self) -> &MealDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn field_error(&self, field: MealField) -> Option<&str> {
        self.errors.get(field.as_str())
    }

    /// Warning text for the review form, if the estimate was flagged.
    pub fn warning(&self) -> Option<&'static str> {
        self.from_flagged_analysis.then_some(OUT_OF_RANGE_WARNING)
    }

    pub fn set_food_name(&mut self, value: impl Into<String>) {
        self.draft.food_name = value.into();
        self.revalidate(MealField::FoodName);
    }

    pub fn set_calories(&mut self, value: i32) {
        self.draft.calories = value;
        self.revalidate(MealField::Calories);
    }

    pub fn set_protein(&mut self, value: f64) {
        self.draft.protein = value;
        self.revalidate(MealField::Protein);
    }

    pub fn set_carbs(&mut self, value: f64) {
        self.draft.carbs = value;
        self.revalidate(MealField::Carbs);
    }

    pub fn set_fats(&mut self, value: f64) {
        self.draft.fats = value;
        self.revalidate(MealField::Fats);
    }

    pub fn set_meal_type(&mut self, value: MealType) {
        self.draft.meal_type = value;
        self.revalidate(MealField::MealType);
    }

    pub fn set_portion_size(&mut self, value: Option<String>) {
        self.draft.portion_size = value;
        self.revalidate(MealField::PortionSize);
    }

    /// Re-check one field, clearing or replacing its message. Other
    /// fields keep whatever state they had.
    fn revalidate(&mut self, field: MealField) {
        let mut next = FieldErrors::new();
        for (name, message) in self.errors.iter() {
            if name != field.as_str() {
                next.record(name, message.to_string());
            }
        }
        if let Some(message) = check_meal_field(&self.draft, field) {
            next.record(field.as_str(), message);
        }
        self.errors = next;
    }

    /// Full-object validation for the save. Any failure blocks the
    /// save and returns every current violation.
    pub fn finish(self) -> Result<Validated<MealDraft>, FieldErrors> {
        validate_meal(self.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;

    fn analysis(calories: i32) -> MealAnalysis {
        MealAnalysis {
            food_name: "Pancakes".to_string(),
            calories,
            protein: 11.0,
            carbs: 60.0,
            fats: 14.0,
            portion_size: "2 stacks".to_string(),
            meal_type: MealType::Breakfast,
            confidence: Confidence::Medium,
        }
    }

    #[test]
    fn test_clean_analysis_has_no_warning() {
        let review = ReviewSession::from_analysis(analysis(520));
        assert!(review.errors().is_empty());
        assert!(review.warning().is_none());
    }

    #[test]
    fn test_out_of_range_analysis_is_flagged_not_rejected() {
        let review = ReviewSession::from_analysis(analysis(12000));
        assert_eq!(
            review.field_error(MealField::Calories),
            Some("Calories must be between 0 and 10000"),
        );
        assert_eq!(review.warning(), Some(OUT_OF_RANGE_WARNING));
        // Still editable: the bad value is shown for correction.
        assert_eq!(review.draft().calories, 12000);
    }

    #[test]
    fn test_editing_one_field_leaves_other_flags_alone() {
        let mut bad = analysis(12000);
        bad.protein = 700.0;
        let mut review = ReviewSession::from_analysis(bad);
        assert_eq!(review.errors().len(), 2);

        review.set_calories(520);
        assert!(review.field_error(MealField::Calories).is_none());
        assert!(review.field_error(MealField::Protein).is_some());
    }

    #[test]
    fn test_edit_can_introduce_an_error() {
        let mut review = ReviewSession::from_analysis(analysis(520));
        review.set_fats(-2.0);
        assert_eq!(
            review.field_error(MealField::Fats),
            Some("Fats must be between 0 and 500g"),
        );
    }

    #[test]
    fn test_finish_blocks_while_any_field_invalid() {
        let mut review = ReviewSession::from_analysis(analysis(12000));
        let errors = review.clone().finish().unwrap_err();
        assert_eq!(errors.len(), 1);

        review.set_calories(800);
        assert!(review.finish().is_ok());
    }

    #[test]
    fn test_manual_entry_flow() {
        let mut review = ReviewSession::manual(MealDraft {
            food_name: "x".to_string(),
            calories: 300,
            protein: 10.0,
            carbs: 30.0,
            fats: 8.0,
            meal_type: MealType::Snack,
            portion_size: None,
        });
        assert!(review.warning().is_none());
        assert!(review.field_error(MealField::FoodName).is_some());

        review.set_food_name("Trail mix");
        assert!(review.finish().is_ok());
    }
}
