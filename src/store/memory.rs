// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory collaborator implementations for tests and local runs.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{GoalsInput, Meal, MealDraft, TimeRange, UserGoals};
use crate::store::{
    FileStorage, GoalsStore, IdentityProvider, MealStore, Session, StoreError,
};
use crate::validation::Validated;

/// Meal store backed by a concurrent map, keyed by meal id.
#[derive(Default)]
pub struct MemoryMealStore {
    meals: DashMap<String, Meal>,
    fail_writes: AtomicBool,
}

impl MemoryMealStore {
    pub fn new() -> MemoryMealStore {
        MemoryMealStore::default()
    }

    /// Make every subsequent write fail, for rollback tests.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write failure injected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MealStore for MemoryMealStore {
    async fn create_meal(
        &self,
        user_id: &str,
        draft: &Validated<MealDraft>,
        image_url: Option<String>,
    ) -> Result<Meal, StoreError> {
        self.check_writable()?;

        let draft = draft.get();
        let meal = Meal {
            id: Uuid::new_v4().to_string(),
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
        };
        self.meals.insert(meal.id.clone(), meal.clone());
        Ok(meal)
    }

    async fn update_meal(
        &self,
        user_id: &str,
        meal_id: &str,
        draft: &Validated<MealDraft>,
    ) -> Result<Meal, StoreError> {
        self.check_writable()?;

        let mut entry = self
            .meals
            .get_mut(meal_id)
            .ok_or_else(|| StoreError::NotFound(meal_id.to_string()))?;
        if entry.user_id != user_id {
            return Err(StoreError::PermissionDenied);
        }

        let draft = draft.get();
        entry.food_name = draft.food_name.clone();
        entry.calories = draft.calories;
        entry.protein = draft.protein;
        entry.carbs = draft.carbs;
        entry.fats = draft.fats;
        entry.meal_type = draft.meal_type;
        entry.portion_size = draft.portion_size.clone();

        Ok(entry.clone())
    }

    async fn delete_meal(&self, user_id: &str, meal_id: &str) -> Result<(), StoreError> {
        self.check_writable()?;

        match self.meals.get(meal_id) {
            Some(entry) if entry.user_id != user_id => return Err(StoreError::PermissionDenied),
            Some(_) => {}
            None => return Err(StoreError::NotFound(meal_id.to_string())),
        }
        self.meals.remove(meal_id);
        Ok(())
    }

    async fn list_meals(&self, user_id: &str, range: &TimeRange) -> Result<Vec<Meal>, StoreError> {
        let (start, end) = range.bounds(Utc::now());
        let mut meals: Vec<Meal> = self
            .meals
            .iter()
            .filter(|entry| {
                entry.user_id == user_id && entry.created_at >= start && entry.created_at < end
            })
            .map(|entry| entry.clone())
            .collect();
        meals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(meals)
    }
}

/// Goals store backed by a concurrent map, keyed by user id.
#[derive(Default)]
pub struct MemoryGoalsStore {
    goals: DashMap<String, UserGoals>,
}

impl MemoryGoalsStore {
    pub fn new() -> MemoryGoalsStore {
        MemoryGoalsStore::default()
    }
}

#[async_trait]
impl GoalsStore for MemoryGoalsStore {
    async fn fetch_goals(&self, user_id: &str) -> Result<Option<UserGoals>, StoreError> {
        Ok(self.goals.get(user_id).map(|entry| *entry))
    }

    async fn upsert_goals(
        &self,
        user_id: &str,
        input: &Validated<GoalsInput>,
    ) -> Result<UserGoals, StoreError> {
        let goals = UserGoals::from(*input.get());
        self.goals.insert(user_id.to_string(), goals);
        Ok(goals)
    }
}

/// File storage backed by a concurrent map.
#[derive(Default)]
pub struct MemoryFileStorage {
    files: DashMap<String, (Vec<u8>, String)>,
}

impl MemoryFileStorage {
    pub fn new() -> MemoryFileStorage {
        MemoryFileStorage::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.files
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://meal-photos/{path}")
    }
}

/// Identity provider with a fixed set of seeded accounts.
#[derive(Default)]
pub struct MemoryIdentity {
    /// email → (password, user id)
    accounts: DashMap<String, (String, String)>,
    /// access token → session
    sessions: DashMap<String, Session>,
    /// Session carried across "visits", like browser storage.
    persisted: RwLock<Option<Session>>,
}

impl MemoryIdentity {
    pub fn new() -> MemoryIdentity {
        MemoryIdentity::default()
    }

    /// Seed an account and return `(provider, user_id)`.
    pub fn with_user(email: &str, password: &str) -> (MemoryIdentity, String) {
        let identity = MemoryIdentity::new();
        let user_id = Uuid::new_v4().to_string();
        identity
            .accounts
            .insert(email.to_string(), (password.to_string(), user_id.clone()));
        (identity, user_id)
    }

    pub fn account_exists(&self, email: &str) -> bool {
        self.accounts.contains_key(email)
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let account = self
            .accounts
            .get(email)
            .ok_or(StoreError::InvalidCredentials)?;
        let (stored_password, user_id) = account.value();
        if stored_password != password {
            return Err(StoreError::InvalidCredentials);
        }

        let session = Session {
            user_id: user_id.clone(),
            email: email.to_string(),
            access_token: Uuid::new_v4().to_string(),
        };
        drop(account);

        self.sessions
            .insert(session.access_token.clone(), session.clone());
        *self.persisted.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        self.sessions.remove(access_token);

        let mut persisted = self.persisted.write().await;
        if persisted
            .as_ref()
            .is_some_and(|s| s.access_token == access_token)
        {
            *persisted = None;
        }
        Ok(())
    }

    async fn restore_session(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.persisted.read().await.clone())
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        let session = self
            .sessions
            .get(access_token)
            .ok_or(StoreError::InvalidCredentials)?;
        let email = session.email.clone();
        drop(session);

        let mut account = self
            .accounts
            .get_mut(&email)
            .ok_or(StoreError::InvalidCredentials)?;
        account.0 = new_password.to_string();
        Ok(())
    }

    async fn delete_account(&self, access_token: &str) -> Result<(), StoreError> {
        let session = self
            .sessions
            .get(access_token)
            .ok_or(StoreError::InvalidCredentials)?;
        let (email, user_id) = (session.email.clone(), session.user_id.clone());
        drop(session);

        self.accounts.remove(&email);
        self.sessions.retain(|_, s| s.user_id != user_id);

        let mut persisted = self.persisted.write().await;
        if persisted.as_ref().is_some_and(|s| s.user_id == user_id) {
            *persisted = None;
        }
        Ok(())
    }
}
