// Startup configuration.
//
// Everything is read once from the environment (a `.env` file is loaded
// first if present). `from_lookup` takes any key -> value function so the
// parsing can be tested without touching the real environment.

use crate::core::cooldown::CooldownConfig;
use crate::core::submissions::SubmissionRules;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_DATABASE_PATH: &str = "data/submissions.db";
const DEFAULT_SHARE_BASE_URL: &str = "https://james.spinthe.games/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    /// Guild to register commands in. Global registration when unset.
    pub guild_id: Option<u64>,
    pub submissions_channel_id: u64,
    pub owner_id: u64,
    pub database_path: String,
    pub share_base_url: String,
    pub cooldown: CooldownConfig,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let parse_id = |key: &'static str, value: String| -> Result<u64, ConfigError> {
            match value.parse::<u64>() {
                Ok(id) if id > 0 => Ok(id),
                _ => Err(ConfigError::Invalid { key, value }),
            }
        };

        let defaults = CooldownConfig::default();
        let max_uses = match get("COMMAND_COOLDOWN_USES") {
            Some(v) => parse_id("COMMAND_COOLDOWN_USES", v)?.min(u32::MAX as u64) as u32,
            None => defaults.max_uses,
        };
        let window = match get("COMMAND_COOLDOWN_SECS") {
            Some(v) => Duration::from_secs(parse_id("COMMAND_COOLDOWN_SECS", v)?),
            None => defaults.window,
        };

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            guild_id: get("GUILD_ID")
                .map(|v| parse_id("GUILD_ID", v))
                .transpose()?,
            submissions_channel_id: parse_id(
                "SUBMISSIONS_CHANNEL_ID",
                required("SUBMISSIONS_CHANNEL_ID")?,
            )?,
            owner_id: parse_id("OWNER_ID", required("OWNER_ID")?)?,
            database_path: get("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            share_base_url: get("SHARE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SHARE_BASE_URL.to_string()),
            cooldown: CooldownConfig { max_uses, window },
        })
    }

    pub fn submission_rules(&self) -> SubmissionRules {
        SubmissionRules {
            submissions_channel_id: self.submissions_channel_id,
            owner_id: self.owner_id,
            share_base_url: self.share_base_url.clone(),
        }
    }
}
