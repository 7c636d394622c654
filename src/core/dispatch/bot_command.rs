// Transport-independent command and reply types.

use crate::core::submissions::{AccessLevel, CategoryName, Role};

/// Who invoked a command, and where.
#[derive(Debug, Clone)]
pub struct Invoker {
    pub user_id: u64,
    pub display_name: String,
    pub channel_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BotCommand {
    SubmitGame {
        url: String,
        category: CategoryName,
    },
    ListSubmissions {
        category: Option<CategoryName>,
    },
    ShareLink {
        category: Option<CategoryName>,
    },
    RemoveSubmission {
        appid: u64,
    },
    ListCategories,
    GrantRole {
        target_id: u64,
        target_name: String,
        role: Role,
    },
    RevokeRole {
        target_id: u64,
        target_name: String,
        role: Role,
    },
    SetShareTitle {
        title: String,
    },
}

impl BotCommand {
    /// Slash command name; also the cooldown key.
    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::SubmitGame { .. } => "submit_game",
            BotCommand::ListSubmissions { .. } => "submissions",
            BotCommand::ShareLink { .. } => "share_link",
            BotCommand::RemoveSubmission { .. } => "remove_submission",
            BotCommand::ListCategories => "categories",
            BotCommand::GrantRole { role: Role::Mod, .. } => "make_mod",
            BotCommand::GrantRole { role: Role::Admin, .. } => "make_admin",
            BotCommand::RevokeRole { role: Role::Mod, .. } => "revoke_mod",
            BotCommand::RevokeRole { role: Role::Admin, .. } => "revoke_admin",
            BotCommand::SetShareTitle { .. } => "share_title",
        }
    }

    /// Access checked before the command runs. Role changes are narrowed
    /// further by the rules engine depending on which role is touched.
    pub fn required_access(&self) -> AccessLevel {
        match self {
            BotCommand::SubmitGame { .. } | BotCommand::ListCategories => AccessLevel::Everyone,
            BotCommand::ListSubmissions { .. }
            | BotCommand::ShareLink { .. }
            | BotCommand::RemoveSubmission { .. }
            | BotCommand::GrantRole { .. }
            | BotCommand::RevokeRole { .. } => AccessLevel::Staff,
            BotCommand::SetShareTitle { .. } => AccessLevel::Admin,
        }
    }
}

/// A single text response. Private replies are only shown to the invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub private: bool,
}

impl Reply {
    pub fn private(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            private: true,
        }
    }

    pub fn public(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            private: false,
        }
    }
}
