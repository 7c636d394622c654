// SQLite-backed submission store.
//
// Tables:
// - users: one row per Discord user, with independent mod/admin flags
// - categories: taxonomy rows, UNIQUE(name)
// - submissions: game links, UNIQUE(appid), foreign keys to users and categories
// - settings: generic name/value pairs, UNIQUE(name)
//
// The UNIQUE constraints are what keep dedup and category seeding correct
// when several commands run at once.

use crate::core::submissions::{
    Category, NewSubmission, Setting, StoreError, Submission, SubmissionStore, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

const SELECT_SUBMISSIONS: &str = r#"
    SELECT s.submission_id, s.user_id, u.username, s.url, s.appid,
           s.category_id, c.name AS category, s.submitted_at
    FROM submissions s
    JOIN users u ON u.user_id = s.user_id
    JOIN categories c ON c.category_id = s.category_id
"#;

pub struct SqliteSubmissionStore {
    pool: Pool<Sqlite>,
}

impl SqliteSubmissionStore {
    /// Open (or create) the database file at `database_path` and run migrations.
    pub async fn new(database_path: &str) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", database_path))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Create tables if they don't exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                is_mod BOOLEAN NOT NULL DEFAULT 0,
                is_admin BOOLEAN NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                category_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS submissions (
                submission_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(user_id),
                url TEXT NOT NULL,
                appid INTEGER NOT NULL UNIQUE,
                category_id INTEGER NOT NULL REFERENCES categories(category_id),
                submitted_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                setting_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for SqliteSubmissionStore {
    async fn get_user(&self, user_id: u64) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn upsert_user(&self, user_id: u64, username: &str) -> Result<User, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (user_id, username)
            VALUES (?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username
            RETURNING user_id, username, is_mod, is_admin
            "#,
        )
        .bind(user_id as i64)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row_to_user(&row)
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET username = ?, is_mod = ?, is_admin = ? WHERE user_id = ?",
        )
        .bind(&user.username)
        .bind(user.is_mod)
        .bind(user.is_admin)
        .bind(user.user_id as i64)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::InvalidRow(format!(
                "unknown user {}",
                user.user_id
            )));
        }
        Ok(())
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query("SELECT category_id, name FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(row_to_category).transpose()
    }

    async fn ensure_category(&self, name: &str) -> Result<(Category, bool), StoreError> {
        let inserted = sqlx::query(
            "INSERT INTO categories (name) VALUES (?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let category = self.get_category_by_name(name).await?.ok_or_else(|| {
            StoreError::InvalidRow(format!("category {} missing after insert", name))
        })?;

        Ok((category, inserted.rows_affected() > 0))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT category_id, name FROM categories ORDER BY category_id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(row_to_category).collect()
    }

    async fn get_submission_by_appid(&self, appid: u64) -> Result<Option<Submission>, StoreError> {
        let row = sqlx::query(&format!("{} WHERE s.appid = ?", SELECT_SUBMISSIONS))
            .bind(appid as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(row_to_submission).transpose()
    }

    async fn list_submissions(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<Submission>, StoreError> {
        let rows = match category {
            Some(name) => {
                sqlx::query(&format!(
                    "{} WHERE c.name = ? ORDER BY s.submission_id",
                    SELECT_SUBMISSIONS
                ))
                .bind(name)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY s.submission_id", SELECT_SUBMISSIONS))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_error)?;

        rows.iter().map(row_to_submission).collect()
    }

    async fn count_submissions_by_category(&self) -> Result<HashMap<i64, usize>, StoreError> {
        let rows = sqlx::query(
            "SELECT category_id, COUNT(*) AS submissions FROM submissions GROUP BY category_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                let category_id: i64 = column(row, "category_id")?;
                let count: i64 = column(row, "submissions")?;
                Ok((category_id, count as usize))
            })
            .collect()
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, StoreError> {
        let appid = submission.appid;
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let submission_id: i64 = sqlx::query(
            r#"
            INSERT INTO submissions (user_id, url, appid, category_id, submitted_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING submission_id
            "#,
        )
        .bind(submission.user_id as i64)
        .bind(&submission.url)
        .bind(appid as i64)
        .bind(submission.category_id)
        .bind(submission.submitted_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| insert_error(e, appid))?
        .try_get("submission_id")
        .map_err(db_error)?;

        let row = sqlx::query(&format!("{} WHERE s.submission_id = ?", SELECT_SUBMISSIONS))
            .bind(submission_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;
        let stored = row_to_submission(&row)?;

        tx.commit().await.map_err(db_error)?;
        Ok(stored)
    }

    async fn delete_submission(&self, appid: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM submissions WHERE appid = ?")
            .bind(appid as i64)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_setting(&self, name: &str) -> Result<Option<Setting>, StoreError> {
        let row = sqlx::query("SELECT setting_id, name, value FROM settings WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(row_to_setting).transpose()
    }

    async fn set_setting(&self, name: &str, value: &str) -> Result<Setting, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO settings (name, value)
            VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET
                value = excluded.value
            RETURNING setting_id, name, value
            "#,
        )
        .bind(name)
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row_to_setting(&row)
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn insert_error(e: sqlx::Error, appid: u64) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateAppId(appid);
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::InvalidRow(format!(
                "submission for app {} references a missing user or category",
                appid
            ));
        }
    }
    db_error(e)
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| StoreError::InvalidRow(format!("{}: {}", name, e)))
}

fn row_to_user(row: &SqliteRow) -> Result<User, StoreError> {
    Ok(User {
        user_id: column::<i64>(row, "user_id")? as u64,
        username: column(row, "username")?,
        is_mod: column(row, "is_mod")?,
        is_admin: column(row, "is_admin")?,
    })
}

fn row_to_category(row: &SqliteRow) -> Result<Category, StoreError> {
    Ok(Category {
        category_id: column(row, "category_id")?,
        name: column(row, "name")?,
    })
}

fn row_to_submission(row: &SqliteRow) -> Result<Submission, StoreError> {
    Ok(Submission {
        submission_id: column(row, "submission_id")?,
        user_id: column::<i64>(row, "user_id")? as u64,
        submitted_by: column(row, "username")?,
        url: column(row, "url")?,
        appid: column::<i64>(row, "appid")? as u64,
        category_id: column(row, "category_id")?,
        category: column(row, "category")?,
        submitted_at: column::<DateTime<Utc>>(row, "submitted_at")?,
    })
}

fn row_to_setting(row: &SqliteRow) -> Result<Setting, StoreError> {
    Ok(Setting {
        setting_id: column(row, "setting_id")?,
        name: column(row, "name")?,
        value: column(row, "value")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::submissions::{
        CategoryName, SubmissionRules, SubmissionService, SubmitOutcome,
    };

    async fn memory_store() -> SqliteSubmissionStore {
        // One connection, so every query sees the same in-memory database.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .unwrap();

        let store = SqliteSubmissionStore::from_pool(pool);
        store.migrate().await.unwrap();
        store
    }

    fn new_submission(user_id: u64, appid: u64, category_id: i64) -> NewSubmission {
        NewSubmission {
            user_id,
            url: format!("https://store.steampowered.com/app/{}/", appid),
            appid,
            category_id,
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_refreshes_name_but_keeps_flags() {
        let store = memory_store().await;

        let created = store.upsert_user(42, "old name").await.unwrap();
        assert_eq!(created, User::new(42, "old name"));

        let mut elevated = created.clone();
        elevated.is_mod = true;
        store.update_user(&elevated).await.unwrap();

        let refreshed = store.upsert_user(42, "new name").await.unwrap();
        assert_eq!(refreshed.username, "new name");
        assert!(refreshed.is_mod);
        assert!(!refreshed.is_admin);
    }

    #[tokio::test]
    async fn update_of_unknown_user_fails() {
        let store = memory_store().await;

        let err = store.update_user(&User::new(7, "ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidRow(_)));
    }

    #[tokio::test]
    async fn category_names_are_unique() {
        let store = memory_store().await;

        let (first, created) = store.ensure_category("rpg").await.unwrap();
        assert!(created);
        let (second, created) = store.ensure_category("rpg").await.unwrap();
        assert!(!created);

        assert_eq!(first, second);
        assert_eq!(store.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_app_id_maps_to_duplicate_error() {
        let store = memory_store().await;
        store.upsert_user(42, "gamer").await.unwrap();
        let (category, _) = store.ensure_category("indie").await.unwrap();

        let stored = store
            .insert_submission(new_submission(42, 441620, category.category_id))
            .await
            .unwrap();
        assert_eq!(stored.appid, 441620);
        assert_eq!(stored.category, "indie");
        assert_eq!(stored.submitted_by, "gamer");

        let err = store
            .insert_submission(new_submission(42, 441620, category.category_id))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateAppId(441620)));
    }

    #[tokio::test]
    async fn submissions_need_existing_user_and_category() {
        let store = memory_store().await;

        let err = store
            .insert_submission(new_submission(42, 570, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidRow(_)));
        assert!(store.list_submissions(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_category_in_insertion_order() {
        let store = memory_store().await;
        store.upsert_user(42, "gamer").await.unwrap();
        let (rpg, _) = store.ensure_category("rpg").await.unwrap();
        let (racing, _) = store.ensure_category("racing").await.unwrap();

        let rows = [
            (30, rpg.category_id),
            (10, racing.category_id),
            (20, rpg.category_id),
        ];
        for (appid, category_id) in rows {
            store
                .insert_submission(new_submission(42, appid, category_id))
                .await
                .unwrap();
        }

        let all: Vec<u64> = store
            .list_submissions(None)
            .await
            .unwrap()
            .iter()
            .map(|s| s.appid)
            .collect();
        assert_eq!(all, vec![30, 10, 20]);

        let rpg_only: Vec<u64> = store
            .list_submissions(Some("rpg"))
            .await
            .unwrap()
            .iter()
            .map(|s| s.appid)
            .collect();
        assert_eq!(rpg_only, vec![30, 20]);

        assert!(store.list_submissions(Some("horror")).await.unwrap().is_empty());

        let counts = store.count_submissions_by_category().await.unwrap();
        assert_eq!(counts.get(&rpg.category_id), Some(&2));
        assert_eq!(counts.get(&racing.category_id), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[tokio::test]
    async fn delete_and_lookup_by_app_id() {
        let store = memory_store().await;
        store.upsert_user(42, "gamer").await.unwrap();
        let (category, _) = store.ensure_category("indie").await.unwrap();
        store
            .insert_submission(new_submission(42, 570, category.category_id))
            .await
            .unwrap();

        assert!(store.get_submission_by_appid(570).await.unwrap().is_some());
        assert!(store.delete_submission(570).await.unwrap());
        assert!(store.get_submission_by_appid(570).await.unwrap().is_none());
        assert!(!store.delete_submission(570).await.unwrap());
    }

    #[tokio::test]
    async fn settings_upsert_by_name() {
        let store = memory_store().await;
        assert!(store.get_setting("share_list_title").await.unwrap().is_none());

        let first = store.set_setting("share_list_title", "friday").await.unwrap();
        let second = store.set_setting("share_list_title", "saturday").await.unwrap();

        assert_eq!(first.setting_id, second.setting_id);
        assert_eq!(second.value, "saturday");
    }

    #[tokio::test]
    async fn reconcile_twice_against_sqlite_seeds_once() {
        let service = SubmissionService::new(
            memory_store().await,
            SubmissionRules {
                submissions_channel_id: 1000,
                owner_id: 1,
                share_base_url: "https://james.spinthe.games/".to_string(),
            },
        );

        assert_eq!(
            service
                .reconcile_categories(&CategoryName::ALL)
                .await
                .unwrap(),
            14
        );
        assert_eq!(
            service
                .reconcile_categories(&CategoryName::ALL)
                .await
                .unwrap(),
            0
        );
        assert_eq!(service.list_categories().await.unwrap().len(), 14);
    }

    #[tokio::test]
    async fn data_survives_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("submissions.db");
        let path = path.to_str().unwrap();

        let rules = SubmissionRules {
            submissions_channel_id: 1000,
            owner_id: 1,
            share_base_url: "https://james.spinthe.games/".to_string(),
        };

        {
            let store = SqliteSubmissionStore::new(path).await.unwrap();
            let service = SubmissionService::new(store, rules);
            let outcome = service
                .submit(
                    42,
                    "gamer",
                    1000,
                    "https://store.steampowered.com/app/441620/Ring_of_Pain/",
                    CategoryName::Indie,
                )
                .await
                .unwrap();
            assert!(matches!(outcome, SubmitOutcome::Accepted(_)));
        }

        let reopened = SqliteSubmissionStore::new(path).await.unwrap();
        let submission = reopened
            .get_submission_by_appid(441620)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submission.user_id, 42);
        assert_eq!(submission.category, "indie");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_of_one_game_store_a_single_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submissions.db");
        let store = SqliteSubmissionStore::new(path.to_str().unwrap())
            .await
            .unwrap();
        let service = std::sync::Arc::new(SubmissionService::new(
            store,
            SubmissionRules {
                submissions_channel_id: 1000,
                owner_id: 1,
                share_base_url: "https://james.spinthe.games/".to_string(),
            },
        ));

        let mut handles = Vec::new();
        for user_id in 100..116u64 {
            let service = std::sync::Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .submit(
                        user_id,
                        &format!("gamer{}", user_id),
                        1000,
                        "https://store.steampowered.com/app/441620/Ring_of_Pain/",
                        CategoryName::Indie,
                    )
                    .await
            }));
        }

        let mut accepted = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                SubmitOutcome::Accepted(_) => accepted += 1,
                SubmitOutcome::RejectedDuplicate { appid } => {
                    assert_eq!(appid, 441620);
                    duplicates += 1;
                }
                other => panic!("unexpected outcome: {:?}", other),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(duplicates, 15);
        assert_eq!(service.list_submissions(None).await.unwrap().len(), 1);
    }
}
