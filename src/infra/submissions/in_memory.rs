// In-memory implementation of SubmissionStore.
//
// Used by the core tests so they run against isolated stores with no
// database. All tables live behind one RwLock, which gives every trait
// method the same all-or-nothing behaviour as a SQLite statement.

use crate::core::submissions::{
    Category, NewSubmission, Setting, StoreError, Submission, SubmissionStore, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredSubmission {
    submission_id: i64,
    user_id: u64,
    url: String,
    appid: u64,
    category_id: i64,
    submitted_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<u64, User>,
    categories: Vec<Category>,
    // Kept in insertion order
    submissions: Vec<StoredSubmission>,
    settings: Vec<Setting>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn resolve(&self, row: &StoredSubmission) -> Result<Submission, StoreError> {
        let category = self
            .categories
            .iter()
            .find(|c| c.category_id == row.category_id)
            .ok_or_else(|| {
                StoreError::InvalidRow(format!("unknown category {}", row.category_id))
            })?;
        let user = self
            .users
            .get(&row.user_id)
            .ok_or_else(|| StoreError::InvalidRow(format!("unknown user {}", row.user_id)))?;

        Ok(Submission {
            submission_id: row.submission_id,
            user_id: row.user_id,
            submitted_by: user.username.clone(),
            url: row.url.clone(),
            appid: row.appid,
            category_id: row.category_id,
            category: category.name.clone(),
            submitted_at: row.submitted_at,
        })
    }
}

pub struct InMemorySubmissionStore {
    tables: RwLock<Tables>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemorySubmissionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn get_user(&self, user_id: u64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn upsert_user(&self, user_id: u64, username: &str) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .entry(user_id)
            .and_modify(|u| u.username = username.to_string())
            .or_insert_with(|| User::new(user_id, username));
        Ok(user.clone())
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user.user_id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(StoreError::InvalidRow(format!(
                "unknown user {}",
                user.user_id
            ))),
        }
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.name == name).cloned())
    }

    async fn ensure_category(&self, name: &str) -> Result<(Category, bool), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.categories.iter().find(|c| c.name == name) {
            return Ok((existing.clone(), false));
        }

        let category = Category {
            category_id: tables.next_id(),
            name: name.to_string(),
        };
        tables.categories.push(category.clone());
        Ok((category, true))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn get_submission_by_appid(&self, appid: u64) -> Result<Option<Submission>, StoreError> {
        let tables = self.tables.read().await;
        tables
            .submissions
            .iter()
            .find(|s| s.appid == appid)
            .map(|row| tables.resolve(row))
            .transpose()
    }

    async fn list_submissions(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<Submission>, StoreError> {
        let tables = self.tables.read().await;
        let mut submissions = Vec::new();
        for row in &tables.submissions {
            let submission = tables.resolve(row)?;
            if category.map_or(true, |name| submission.category == name) {
                submissions.push(submission);
            }
        }
        Ok(submissions)
    }

    async fn count_submissions_by_category(&self) -> Result<HashMap<i64, usize>, StoreError> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for row in &tables.submissions {
            *counts.entry(row.category_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.submissions.iter().any(|s| s.appid == submission.appid) {
            return Err(StoreError::DuplicateAppId(submission.appid));
        }

        let row = StoredSubmission {
            submission_id: tables.next_id(),
            user_id: submission.user_id,
            url: submission.url,
            appid: submission.appid,
            category_id: submission.category_id,
            submitted_at: submission.submitted_at,
        };
        // Resolve first so a dangling reference is never stored.
        let resolved = tables.resolve(&row)?;
        tables.submissions.push(row);
        Ok(resolved)
    }

    async fn delete_submission(&self, appid: u64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.submissions.len();
        tables.submissions.retain(|s| s.appid != appid);
        Ok(tables.submissions.len() < before)
    }

    async fn get_setting(&self, name: &str) -> Result<Option<Setting>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.settings.iter().find(|s| s.name == name).cloned())
    }

    async fn set_setting(&self, name: &str, value: &str) -> Result<Setting, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.settings.iter_mut().find(|s| s.name == name) {
            existing.value = value.to_string();
            return Ok(existing.clone());
        }

        let setting = Setting {
            setting_id: tables.next_id(),
            name: name.to_string(),
            value: value.to_string(),
        };
        tables.settings.push(setting.clone());
        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_submission(appid: u64, category_id: i64) -> NewSubmission {
        NewSubmission {
            user_id: 1,
            url: format!("https://store.steampowered.com/app/{}/", appid),
            appid,
            category_id,
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_keeps_flags_and_refreshes_name() {
        let store = InMemorySubmissionStore::new();

        let mut user = store.upsert_user(1, "old").await.unwrap();
        user.is_admin = true;
        store.update_user(&user).await.unwrap();

        let refreshed = store.upsert_user(1, "new").await.unwrap();
        assert_eq!(refreshed.username, "new");
        assert!(refreshed.is_admin);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_app_id() {
        let store = InMemorySubmissionStore::new();
        store.upsert_user(1, "gamer").await.unwrap();
        let (category, _) = store.ensure_category("rpg").await.unwrap();

        store
            .insert_submission(new_submission(570, category.category_id))
            .await
            .unwrap();
        let err = store
            .insert_submission(new_submission(570, category.category_id))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateAppId(570)));
    }

    #[tokio::test]
    async fn insert_rejects_dangling_references() {
        let store = InMemorySubmissionStore::new();

        let err = store
            .insert_submission(new_submission(570, 99))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidRow(_)));
        assert!(store.list_submissions(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ensure_category_is_idempotent() {
        let store = InMemorySubmissionStore::new();

        let (first, created) = store.ensure_category("horror").await.unwrap();
        assert!(created);
        let (second, created) = store.ensure_category("horror").await.unwrap();
        assert!(!created);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn settings_are_overwritten_in_place() {
        let store = InMemorySubmissionStore::new();

        let first = store.set_setting("share_list_title", "a").await.unwrap();
        let second = store.set_setting("share_list_title", "b").await.unwrap();

        assert_eq!(first.setting_id, second.setting_id);
        assert_eq!(
            store
                .get_setting("share_list_title")
                .await
                .unwrap()
                .map(|s| s.value),
            Some("b".to_string())
        );
    }
}
