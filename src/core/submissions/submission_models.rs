// Submission domain models - the data the rules engine works with.
//
// These are pure domain types with no Discord dependencies.
// Ids are plain u64 snowflakes so any frontend can produce them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A community member the bot has seen at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: u64,
    pub username: String,
    pub is_mod: bool,
    pub is_admin: bool,
}

impl User {
    /// A freshly seen user with no privileges.
    pub fn new(user_id: u64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            is_mod: false,
            is_admin: false,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        match role {
            Role::Mod => self.is_mod,
            Role::Admin => self.is_admin,
        }
    }

    pub fn set_role(&mut self, role: Role, granted: bool) {
        match role {
            Role::Mod => self.is_mod = granted,
            Role::Admin => self.is_admin = granted,
        }
    }
}

/// The fixed game taxonomy. Every category row in the store has one of these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryName {
    Action,
    Adventure,
    Casual,
    Fighting,
    Horror,
    Indie,
    Platformer,
    Puzzle,
    Racing,
    Rpg,
    Shooter,
    Simulation,
    Sports,
    Strategy,
}

impl CategoryName {
    pub const ALL: [CategoryName; 14] = [
        CategoryName::Action,
        CategoryName::Adventure,
        CategoryName::Casual,
        CategoryName::Fighting,
        CategoryName::Horror,
        CategoryName::Indie,
        CategoryName::Platformer,
        CategoryName::Puzzle,
        CategoryName::Racing,
        CategoryName::Rpg,
        CategoryName::Shooter,
        CategoryName::Simulation,
        CategoryName::Sports,
        CategoryName::Strategy,
    ];

    /// The name stored in the categories table.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryName::Action => "action",
            CategoryName::Adventure => "adventure",
            CategoryName::Casual => "casual",
            CategoryName::Fighting => "fighting",
            CategoryName::Horror => "horror",
            CategoryName::Indie => "indie",
            CategoryName::Platformer => "platformer",
            CategoryName::Puzzle => "puzzle",
            CategoryName::Racing => "racing",
            CategoryName::Rpg => "rpg",
            CategoryName::Shooter => "shooter",
            CategoryName::Simulation => "simulation",
            CategoryName::Sports => "sports",
            CategoryName::Strategy => "strategy",
        }
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for CategoryName {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CategoryName::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A stored category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: i64,
    pub name: String,
}

/// A category together with how many submissions use it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: Category,
    pub submissions: usize,
}

/// A stored game submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: i64,
    pub user_id: u64,
    /// Submitter's username, resolved when the row is read.
    pub submitted_by: String,
    pub url: String,
    /// Steam app id extracted from `url`. Unique across all submissions.
    pub appid: u64,
    pub category_id: i64,
    /// Category name, resolved when the row is read.
    pub category: String,
    pub submitted_at: DateTime<Utc>,
}

/// Everything needed to insert a submission row.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: u64,
    pub url: String,
    pub appid: u64,
    pub category_id: i64,
    pub submitted_at: DateTime<Utc>,
}

/// Generic name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub setting_id: i64,
    pub name: String,
    pub value: String,
}

/// Roles that can be granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Mod,
    Admin,
}

impl Role {
    /// Access level a caller needs before changing this role on someone else.
    pub fn required_to_change(&self) -> AccessLevel {
        match self {
            Role::Mod => AccessLevel::Admin,
            Role::Admin => AccessLevel::Owner,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Mod => write!(f, "mod"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Access checks, evaluated against the user's independent flags.
///
/// - `Staff`: owner, mod or admin
/// - `Admin`: owner or admin
/// - `Owner`: only the configured owner id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Everyone,
    Staff,
    Admin,
    Owner,
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessLevel::Everyone => write!(f, "everyone"),
            AccessLevel::Staff => write!(f, "mod or admin"),
            AccessLevel::Admin => write!(f, "admin"),
            AccessLevel::Owner => write!(f, "owner"),
        }
    }
}

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(Submission),
    RejectedWrongChannel,
    RejectedInvalidLink(super::steam_link::LinkError),
    RejectedDuplicate { appid: u64 },
}

/// Result of granting or revoking a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    /// The target's flag was flipped.
    Changed(User),
    /// The target already had (or already lacked) the role.
    Unchanged(User),
    Forbidden { required: AccessLevel },
}
