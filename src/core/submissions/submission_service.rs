// The submission rules engine.
//
// Owns the store handle and enforces every business rule: channel
// restriction, link validation, dedup by app id, role checks and the
// category taxonomy. Expected failures come back as outcome enums; only
// storage problems are errors.

use super::share_link::{self, DEFAULT_LIST_TITLE, LIST_TITLE_SETTING};
use super::steam_link;
use super::submission_models::{
    AccessLevel, CategoryCount, CategoryName, NewSubmission, Role, RoleChange, Submission,
    SubmitOutcome,
};
use super::submission_store::{StoreError, SubmissionStore};
use chrono::Utc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// Deployment-specific values the rules depend on.
#[derive(Debug, Clone)]
pub struct SubmissionRules {
    /// The only channel `/submit_game` is accepted in.
    pub submissions_channel_id: u64,
    /// The bot owner, who passes every access check.
    pub owner_id: u64,
    pub share_base_url: String,
}

pub struct SubmissionService<S: SubmissionStore> {
    store: S,
    rules: SubmissionRules,
}

impl<S: SubmissionStore> SubmissionService<S> {
    pub fn new(store: S, rules: SubmissionRules) -> Self {
        Self { store, rules }
    }

    pub fn rules(&self) -> &SubmissionRules {
        &self.rules
    }

    /// Record a game submission.
    ///
    /// The channel is checked before anything else, so a rejection from the
    /// wrong channel says nothing about the link and writes nothing.
    pub async fn submit(
        &self,
        caller_id: u64,
        caller_name: &str,
        channel_id: u64,
        url: &str,
        category: CategoryName,
    ) -> Result<SubmitOutcome, SubmissionError> {
        if channel_id != self.rules.submissions_channel_id {
            tracing::info!(
                user_id = caller_id,
                channel_id,
                "Submission attempted outside the submissions channel"
            );
            return Ok(SubmitOutcome::RejectedWrongChannel);
        }

        let appid = match steam_link::parse_app_id(url) {
            Ok(appid) => appid,
            Err(err) => {
                tracing::info!(user_id = caller_id, error = %err, "Rejected submission link");
                return Ok(SubmitOutcome::RejectedInvalidLink(err));
            }
        };

        // The user row must exist before a submission can reference it.
        self.store.upsert_user(caller_id, caller_name).await?;

        if self.store.get_submission_by_appid(appid).await?.is_some() {
            tracing::info!(user_id = caller_id, appid, "Duplicate submission");
            return Ok(SubmitOutcome::RejectedDuplicate { appid });
        }

        let (category_row, created) = self.store.ensure_category(category.as_str()).await?;
        if created {
            tracing::warn!(category = %category, "Category was missing and has been created");
        }

        let new_submission = NewSubmission {
            user_id: caller_id,
            url: url.trim().to_string(),
            appid,
            category_id: category_row.category_id,
            submitted_at: Utc::now(),
        };

        match self.store.insert_submission(new_submission).await {
            Ok(submission) => {
                tracing::info!(
                    user_id = caller_id,
                    appid,
                    category = %category,
                    "Accepted submission"
                );
                Ok(SubmitOutcome::Accepted(submission))
            }
            // Lost a race with a concurrent submission of the same app.
            Err(StoreError::DuplicateAppId(appid)) => {
                Ok(SubmitOutcome::RejectedDuplicate { appid })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// All submissions, or only those in `category`, in insertion order.
    pub async fn list_submissions(
        &self,
        category: Option<CategoryName>,
    ) -> Result<Vec<Submission>, SubmissionError> {
        Ok(self
            .store
            .list_submissions(category.map(|c| c.as_str()))
            .await?)
    }

    /// Remove a submission by app id. Returns false if there was none.
    pub async fn remove_submission(&self, appid: u64) -> Result<bool, SubmissionError> {
        let removed = self.store.delete_submission(appid).await?;
        if removed {
            tracing::info!(appid, "Removed submission");
        }
        Ok(removed)
    }

    /// Stored categories with their submission counts, in taxonomy order.
    pub async fn list_categories(&self) -> Result<Vec<CategoryCount>, SubmissionError> {
        let categories = self.store.list_categories().await?;
        let totals = self.store.count_submissions_by_category().await?;

        let mut counts: Vec<CategoryCount> = categories
            .into_iter()
            .map(|category| CategoryCount {
                submissions: totals.get(&category.category_id).copied().unwrap_or(0),
                category,
            })
            .collect();

        counts.sort_by_key(|c| {
            CategoryName::ALL
                .iter()
                .position(|name| name.as_str() == c.category.name)
                .unwrap_or(CategoryName::ALL.len())
        });

        Ok(counts)
    }

    /// Does `caller_id` pass the given access level?
    ///
    /// Mod and admin are independent flags, not a ladder: `Staff` is satisfied
    /// by either. The owner passes everything without needing a user row.
    pub async fn authorize(
        &self,
        caller_id: u64,
        level: AccessLevel,
    ) -> Result<bool, SubmissionError> {
        if level == AccessLevel::Everyone || caller_id == self.rules.owner_id {
            return Ok(true);
        }
        if level == AccessLevel::Owner {
            return Ok(false);
        }

        let Some(user) = self.store.get_user(caller_id).await? else {
            return Ok(false);
        };

        Ok(match level {
            AccessLevel::Staff => user.is_mod || user.is_admin,
            AccessLevel::Admin => user.is_admin,
            AccessLevel::Everyone | AccessLevel::Owner => false,
        })
    }

    /// Give `role` to the target user, creating their row if needed.
    pub async fn grant_role(
        &self,
        caller_id: u64,
        target_id: u64,
        target_name: &str,
        role: Role,
    ) -> Result<RoleChange, SubmissionError> {
        self.change_role(caller_id, target_id, target_name, role, true)
            .await
    }

    /// Take `role` away from the target user.
    pub async fn revoke_role(
        &self,
        caller_id: u64,
        target_id: u64,
        target_name: &str,
        role: Role,
    ) -> Result<RoleChange, SubmissionError> {
        self.change_role(caller_id, target_id, target_name, role, false)
            .await
    }

    async fn change_role(
        &self,
        caller_id: u64,
        target_id: u64,
        target_name: &str,
        role: Role,
        granted: bool,
    ) -> Result<RoleChange, SubmissionError> {
        let required = role.required_to_change();
        if !self.authorize(caller_id, required).await? {
            return Ok(RoleChange::Forbidden { required });
        }

        let mut target = self.store.upsert_user(target_id, target_name).await?;
        if target.has_role(role) == granted {
            return Ok(RoleChange::Unchanged(target));
        }

        target.set_role(role, granted);
        self.store.update_user(&target).await?;

        tracing::info!(
            caller_id,
            target_id,
            role = %role,
            granted,
            "Changed user role"
        );

        Ok(RoleChange::Changed(target))
    }

    /// Create every taxonomy category that isn't stored yet.
    ///
    /// Safe to run repeatedly; returns how many rows this call created.
    pub async fn reconcile_categories(
        &self,
        taxonomy: &[CategoryName],
    ) -> Result<usize, SubmissionError> {
        let mut created = 0;
        for name in taxonomy {
            if self.store.get_category_by_name(name.as_str()).await?.is_some() {
                continue;
            }
            let (_, inserted) = self.store.ensure_category(name.as_str()).await?;
            if inserted {
                created += 1;
            }
        }

        if created > 0 {
            tracing::info!(created, "Seeded missing categories");
        }
        Ok(created)
    }

    /// Share link covering the selected submissions, or `None` if there are none.
    pub async fn share_link(
        &self,
        category: Option<CategoryName>,
    ) -> Result<Option<String>, SubmissionError> {
        let submissions = self.list_submissions(category).await?;
        if submissions.is_empty() {
            return Ok(None);
        }

        let title = self.share_title().await?;
        let appids: Vec<u64> = submissions.iter().map(|s| s.appid).collect();

        Ok(Some(share_link::build_share_link(
            &self.rules.share_base_url,
            &title,
            &appids,
        )))
    }

    pub async fn share_title(&self) -> Result<String, SubmissionError> {
        Ok(self
            .store
            .get_setting(LIST_TITLE_SETTING)
            .await?
            .map(|s| s.value)
            .unwrap_or_else(|| DEFAULT_LIST_TITLE.to_string()))
    }

    /// Store the list title used in share links. Returns the stored title.
    pub async fn set_share_title(&self, title: &str) -> Result<String, SubmissionError> {
        let title = share_link::validate_title(title).map_err(SubmissionError::InvalidSetting)?;
        let setting = self.store.set_setting(LIST_TITLE_SETTING, title).await?;
        Ok(setting.value)
    }
}
