// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Optimistic mutations over the external stores.
//!
//! Every write follows the same discipline: snapshot the cached
//! collection, apply the change locally, issue the remote write, roll
//! back on failure, and invalidate on settle so the next read
//! reconciles against the store (replacing temporary ids with real
//! ones). Writes to one collection are serialized by a per-collection
//! mutex; cross-device writes are last-write-wins at the store.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::client::cache::{QueryCache, QueryKey};
use crate::client::errors::ClientError;
use crate::client::intake::CapturedImage;
use crate::models::{GoalsInput, Meal, MealDraft, TimeRange, UserGoals};
use crate::store::{FileStorage, GoalsStore, MealStore};
use crate::validation::Validated;

pub const MEALS_SCOPE: &str = "meals";
pub const GOALS_SCOPE: &str = "goals";

fn meals_key(user_id: &str, range: &TimeRange) -> QueryKey {
    QueryKey::new(MEALS_SCOPE, format!("{user_id}:{}", range.cache_key()))
}

fn goals_key(user_id: &str) -> QueryKey {
    QueryKey::new(GOALS_SCOPE, user_id)
}

/// Meal reads and optimistic writes.
pub struct MealMutations {
    store: Arc<dyn MealStore>,
    files: Arc<dyn FileStorage>,
    cache: Arc<QueryCache<Vec<Meal>>>,
    write_lock: Mutex<()>,
}

impl MealMutations {
    pub fn new(
        store: Arc<dyn MealStore>,
        files: Arc<dyn FileStorage>,
        cache: Arc<QueryCache<Vec<Meal>>>,
    ) -> MealMutations {
        MealMutations {
            store,
            files,
            cache,
            write_lock: Mutex::new(()),
        }
    }

    /// Read-through list: a fresh cache entry is served as-is, a stale
    /// or missing one is refetched from the store.
    pub async fn list(&self, user_id: &str, range: &TimeRange) -> Result<Vec<Meal>, ClientError> {
        let key = meals_key(user_id, range);
        if let Some(meals) = self.cache.get_fresh(&key) {
            return Ok(meals);
        }

        let meals = self.store.list_meals(user_id, range).await?;
        self.cache.put(key, meals.clone());
        Ok(meals)
    }

    /// Create a meal, optionally uploading its photo first. The
    /// optimistic record (temp id) is visible in every cached meal
    /// query until the next refetch swaps in the stored one.
    pub async fn add_meal(
        &self,
        user_id: &str,
        draft: Validated<MealDraft>,
        photo: Option<&CapturedImage>,
    ) -> Result<Meal, ClientError> {
        // Upload outside the lock: it can be slow and touches nothing
        // the cache protects.
        let image_url = match photo {
            Some(image) => {
                let path = format!(
                    "{user_id}/{}.{}",
                    Utc::now().timestamp_millis(),
                    image.extension()
                );
                self.files
                    .upload(&path, image.bytes.clone(), &image.mime)
                    .await?;
                Some(self.files.public_url(&path))
            }
            None => None,
        };

        let _guard = self.write_lock.lock().await;
        let snapshot = self.cache.snapshot(MEALS_SCOPE);

        let optimistic = Meal::optimistic(user_id, draft.get(), image_url.clone());
        self.cache.apply(MEALS_SCOPE, |_, meals| {
            meals.insert(0, optimistic.clone());
        });

        let result = self.store.create_meal(user_id, &draft, image_url).await;
        if result.is_err() {
            self.cache.rollback(snapshot);
        }
        self.cache.invalidate(MEALS_SCOPE);

        Ok(result?)
    }

    /// Replace the editable fields of a meal, in place everywhere it
    /// is cached.
    pub async fn edit_meal(
        &self,
        user_id: &str,
        meal_id: &str,
        draft: Validated<MealDraft>,
    ) -> Result<Meal, ClientError> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.cache.snapshot(MEALS_SCOPE);

        let fields = draft.get().clone();
        self.cache.apply(MEALS_SCOPE, |_, meals| {
            for meal in meals.iter_mut().filter(|m| m.id == meal_id) {
                meal.food_name = fields.food_name.clone();
                meal.calories = fields.calories;
                meal.protein = fields.protein;
                meal.carbs = fields.carbs;
                meal.fats = fields.fats;
                meal.meal_type = fields.meal_type;
                meal.portion_size = fields.portion_size.clone();
            }
        });

        let result = self.store.update_meal(user_id, meal_id, &draft).await;
        if result.is_err() {
            self.cache.rollback(snapshot);
        }
        self.cache.invalidate(MEALS_SCOPE);

        Ok(result?)
    }

    pub async fn remove_meal(&self, user_id: &str, meal_id: &str) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.cache.snapshot(MEALS_SCOPE);

        self.cache.apply(MEALS_SCOPE, |_, meals| {
            meals.retain(|meal| meal.id != meal_id);
        });

        let result = self.store.delete_meal(user_id, meal_id).await;
        if result.is_err() {
            self.cache.rollback(snapshot);
        }
        self.cache.invalidate(MEALS_SCOPE);

        Ok(result?)
    }
}

/// Goal reads and optimistic upserts.
pub struct GoalsMutations {
    store: Arc<dyn GoalsStore>,
    cache: Arc<QueryCache<UserGoals>>,
    write_lock: Mutex<()>,
}

impl GoalsMutations {
    pub fn new(store: Arc<dyn GoalsStore>, cache: Arc<QueryCache<UserGoals>>) -> GoalsMutations {
        GoalsMutations {
            store,
            cache,
            write_lock: Mutex::new(()),
        }
    }

    /// Stored goals, or the defaults for a user who never saved any.
    pub async fn fetch_or_default(&self, user_id: &str) -> Result<UserGoals, ClientError> {
        let key = goals_key(user_id);
        if let Some(goals) = self.cache.get_fresh(&key) {
            return Ok(goals);
        }

        let goals = self
            .store
            .fetch_goals(user_id)
            .await?
            .unwrap_or_default();
        self.cache.put(key, goals);
        Ok(goals)
    }

    pub async fn save(
        &self,
        user_id: &str,
        input: Validated<GoalsInput>,
    ) -> Result<UserGoals, ClientError> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.cache.snapshot(GOALS_SCOPE);

        self.cache
            .put(goals_key(user_id), UserGoals::from(*input.get()));

        let result = self.store.upsert_goals(user_id, &input).await;
        if result.is_err() {
            self.cache.rollback(snapshot);
        }
        self.cache.invalidate(GOALS_SCOPE);

        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealType;
    use crate::store::memory::{MemoryFileStorage, MemoryGoalsStore, MemoryMealStore};
    use crate::validation::{validate_goals, validate_meal};

    fn draft(name: &str) -> Validated<MealDraft> {
        validate_meal(MealDraft {
            food_name: name.to_string(),
            calories: 400,
            protein: 25.0,
            carbs: 40.0,
            fats: 15.0,
            meal_type: MealType::Dinner,
            portion_size: None,
        })
        .unwrap()
    }

    fn meal_mutations() -> (Arc<MemoryMealStore>, Arc<MemoryFileStorage>, MealMutations) {
        let store = Arc::new(MemoryMealStore::new());
        let files = Arc::new(MemoryFileStorage::new());
        let mutations = MealMutations::new(
            store.clone(),
            files.clone(),
            Arc::new(QueryCache::new()),
        );
        (store, files, mutations)
    }

    #[tokio::test]
    async fn test_add_then_list_reconciles_temp_id() {
        let (_, _, mutations) = meal_mutations();

        let created = mutations.add_meal("u1", draft("Curry"), None).await.unwrap();
        assert!(!created.is_optimistic());

        // The write invalidated the cache, so this list refetches and
        // only the stored record (server id) remains.
        let meals = mutations.list("u1", &TimeRange::Today).await.unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].id, created.id);
        assert!(!meals[0].is_optimistic());
    }

    #[tokio::test]
    async fn test_failed_create_rolls_back() {
        let (store, _, mutations) = meal_mutations();

        // Warm the cache, then make the store refuse writes.
        let before = mutations.list("u1", &TimeRange::Today).await.unwrap();
        assert!(before.is_empty());
        store.set_fail_writes(true);

        let err = mutations.add_meal("u1", draft("Curry"), None).await.unwrap_err();
        assert!(!err.user_message().is_empty());

        store.set_fail_writes(false);
        let after = mutations.list("u1", &TimeRange::Today).await.unwrap();
        assert!(after.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_meal_rolls_back_unchanged() {
        let (_, _, mutations) = meal_mutations();
        let created = mutations.add_meal("u1", draft("Curry"), None).await.unwrap();
        mutations.list("u1", &TimeRange::Today).await.unwrap();

        let err = mutations.remove_meal("u1", "already-gone").await.unwrap_err();
        assert!(matches!(err, ClientError::Store(_)));

        let meals = mutations.list("u1", &TimeRange::Today).await.unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].id, created.id);
    }

    #[tokio::test]
    async fn test_edit_replaces_fields_in_place() {
        let (_, _, mutations) = meal_mutations();
        let created = mutations.add_meal("u1", draft("Curry"), None).await.unwrap();

        let updated = mutations
            .edit_meal("u1", &created.id, draft("Green curry"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.food_name, "Green curry");
    }

    #[tokio::test]
    async fn test_photo_uploads_under_user_prefix() {
        let (_, files, mutations) = meal_mutations();
        let image = CapturedImage {
            bytes: vec![9, 9, 9],
            mime: "image/jpeg".to_string(),
            file_name: "meal.jpg".to_string(),
            original_size: 3,
            compressed_size: 3,
            compression_fallback: false,
        };

        let created = mutations
            .add_meal("u1", draft("Curry"), Some(&image))
            .await
            .unwrap();

        assert_eq!(files.len(), 1);
        let url = created.image_url.unwrap();
        assert!(url.contains("u1/"), "url: {url}");
        assert!(url.ends_with(".jpg"), "url: {url}");
    }

    #[tokio::test]
    async fn test_goals_default_then_save() {
        let store = Arc::new(MemoryGoalsStore::new());
        let mutations = GoalsMutations::new(store, Arc::new(QueryCache::new()));

        assert_eq!(
            mutations.fetch_or_default("u1").await.unwrap(),
            UserGoals::default(),
        );

        let input = validate_goals(GoalsInput {
            daily_calories: 2400,
            target_protein: 180,
            target_carbs: 240,
            target_fats: 80,
        })
        .unwrap();
        let saved = mutations.save("u1", input).await.unwrap();
        assert_eq!(saved.daily_calories, 2400);

        assert_eq!(mutations.fetch_or_default("u1").await.unwrap(), saved);
    }
}
