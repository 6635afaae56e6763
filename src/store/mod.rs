// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! External collaborator seams: persistence, file storage, identity.
//!
//! The client pipeline only ever talks to these traits. Production
//! deployments back them with a hosted data store; the in-memory
//! implementations in [`memory`] serve tests and local development.

pub mod memory;

use async_trait::async_trait;

use crate::models::{GoalsInput, Meal, MealDraft, TimeRange, UserGoals};
use crate::validation::Validated;

/// Failures surfaced by any collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("permission denied")]
    PermissionDenied,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Meal persistence. Writes only accept validated drafts.
#[async_trait]
pub trait MealStore: Send + Sync {
    /// Create a meal and return the stored record with its assigned
    /// id and timestamp.
    async fn create_meal(
        &self,
        user_id: &str,
        draft: &Validated<MealDraft>,
        image_url: Option<String>,
    ) -> Result<Meal, StoreError>;

    /// Replace the editable fields of an existing meal.
    async fn update_meal(
        &self,
        user_id: &str,
        meal_id: &str,
        draft: &Validated<MealDraft>,
    ) -> Result<Meal, StoreError>;

    async fn delete_meal(&self, user_id: &str, meal_id: &str) -> Result<(), StoreError>;

    /// List a user's meals within a time range, newest first.
    async fn list_meals(&self, user_id: &str, range: &TimeRange) -> Result<Vec<Meal>, StoreError>;
}

/// Daily goal persistence.
#[async_trait]
pub trait GoalsStore: Send + Sync {
    /// Stored goals, or `None` if the user never saved any.
    async fn fetch_goals(&self, user_id: &str) -> Result<Option<UserGoals>, StoreError>;

    async fn upsert_goals(
        &self,
        user_id: &str,
        input: &Validated<GoalsInput>,
    ) -> Result<UserGoals, StoreError>;
}

/// Meal photo storage.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Public URL for an uploaded path. Pure string construction, no
    /// network.
    fn public_url(&self, path: &str) -> String;
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
}

/// Account and session management.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError>;

    /// The session persisted from a previous visit, if any.
    async fn restore_session(&self) -> Result<Option<Session>, StoreError>;

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), StoreError>;

    /// Permanently delete the account behind the session. Callers are
    /// expected to re-verify the password first.
    async fn delete_account(&self, access_token: &str) -> Result<(), StoreError>;
}
