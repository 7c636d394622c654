// Storage port for the submission system.
//
// The core defines WHAT it needs; `infra::submissions` provides the SQLite
// implementation used in production and an in-memory one used by tests.

use super::submission_models::{Category, NewSubmission, Setting, Submission, User};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    /// The UNIQUE(appid) constraint rejected an insert.
    #[error("A submission for app {0} already exists")]
    DuplicateAppId(u64),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

/// Persistence for users, categories, submissions and settings.
///
/// Every method is a single atomic operation. Implementations must enforce
/// uniqueness of `Submission::appid` and `Category::name` themselves, so
/// concurrent callers can't race past a read-then-write check.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn get_user(&self, user_id: u64) -> Result<Option<User>, StoreError>;

    /// Insert the user with default flags, or refresh the username of an
    /// existing one. Flags are never touched. Returns the stored row.
    async fn upsert_user(&self, user_id: u64, username: &str) -> Result<User, StoreError>;

    /// Overwrite username and flags of an existing user.
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError>;

    /// Create the category if no row with this name exists.
    /// Returns the row and whether it was created by this call.
    async fn ensure_category(&self, name: &str) -> Result<(Category, bool), StoreError>;

    /// All categories in id order.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn get_submission_by_appid(&self, appid: u64) -> Result<Option<Submission>, StoreError>;

    /// Submissions in insertion order, optionally limited to one category name.
    async fn list_submissions(&self, category: Option<&str>)
        -> Result<Vec<Submission>, StoreError>;

    /// Number of submissions per category id. Categories without
    /// submissions are absent from the map.
    async fn count_submissions_by_category(&self) -> Result<HashMap<i64, usize>, StoreError>;

    /// Fails with `StoreError::DuplicateAppId` if the app id is taken.
    async fn insert_submission(&self, submission: NewSubmission)
        -> Result<Submission, StoreError>;

    /// Returns false when no submission had this app id.
    async fn delete_submission(&self, appid: u64) -> Result<bool, StoreError>;

    async fn get_setting(&self, name: &str) -> Result<Option<Setting>, StoreError>;

    async fn set_setting(&self, name: &str, value: &str) -> Result<Setting, StoreError>;
}
