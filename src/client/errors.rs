// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side error taxonomy and user-facing messages.
//!
//! `Display` carries the technical detail for logs; [`ClientError::user_message`]
//! is the only text ever shown in the UI.

use crate::store::StoreError;
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Image intake rejection; the message is already user-facing.
    #[error("image rejected: {0}")]
    Image(String),

    /// Local rate limiter denied the attempt.
    #[error("rate limited locally, retry in {retry_in_secs}s")]
    RateLimited { retry_in_secs: u64 },

    /// The analysis endpoint reported a failure envelope.
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// Transport never produced a usable response.
    #[error("network failure: {0}")]
    Network(String),

    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Export requested over an empty meal list.
    #[error("nothing to export")]
    EmptyExport,

    /// No signed-in session for an operation that needs one.
    #[error("no active session")]
    SignedOut,

    /// Password re-verification before account deletion failed.
    #[error("password re-verification failed")]
    IncorrectPassword,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClientError {
    /// The notification text for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Image(message) => message.clone(),
            ClientError::RateLimited { retry_in_secs: 0 } => {
                "Too many requests. Please wait a moment.".to_string()
            }
            ClientError::RateLimited { retry_in_secs } => {
                format!("Too many requests. Wait {retry_in_secs} seconds.")
            }
            ClientError::Analysis(message) => message.clone(),
            ClientError::Network(_) => {
                "Connection error. Check your internet connection.".to_string()
            }
            ClientError::Validation(errors) => {
                let count = errors.len();
                let plural = if count == 1 { "" } else { "s" };
                format!("Please correct the errors in the form ({count} error{plural})")
            }
            ClientError::EmptyExport => "No data to export".to_string(),
            ClientError::SignedOut => "Authentication error. Please sign in again.".to_string(),
            ClientError::IncorrectPassword => "Incorrect password".to_string(),
            ClientError::Store(StoreError::InvalidCredentials) => {
                "Authentication error. Please sign in again.".to_string()
            }
            ClientError::Store(StoreError::PermissionDenied) => {
                "You do not have permission for this action.".to_string()
            }
            ClientError::Store(StoreError::Unavailable(_)) => {
                "Error communicating with the server. Try again.".to_string()
            }
            ClientError::Store(StoreError::NotFound(_)) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message_includes_countdown() {
        let err = ClientError::RateLimited { retry_in_secs: 42 };
        assert_eq!(err.user_message(), "Too many requests. Wait 42 seconds.");

        let err = ClientError::RateLimited { retry_in_secs: 0 };
        assert_eq!(err.user_message(), "Too many requests. Please wait a moment.");
    }

    #[test]
    fn test_store_errors_stay_generic() {
        let err = ClientError::Store(StoreError::Unavailable("pg timeout at 10.0.0.3".into()));
        assert!(!err.user_message().contains("10.0.0.3"));
    }

    #[test]
    fn test_validation_message_counts_errors() {
        let mut draft = crate::models::MealDraft {
            food_name: "x".to_string(),
            calories: -1,
            protein: 0.0,
            carbs: 0.0,
            fats: 0.0,
            meal_type: crate::models::MealType::Lunch,
            portion_size: None,
        };
        draft.protein = -1.0;
        let errors = crate::validation::check_meal(&draft);
        let err = ClientError::Validation(errors);
        assert_eq!(
            err.user_message(),
            "Please correct the errors in the form (3 errors)",
        );
    }
}
