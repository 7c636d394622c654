// Discord commands module.
//
// Every command follows the same shape:
// 1. Pull primitive values out of the Discord types
// 2. Build a `BotCommand` and hand it to the dispatcher
// 3. Send back whatever `Reply` comes out
//
// Permission checks, cooldowns and formatting all live in the core.

use crate::core::dispatch::CommandDispatcher;
use crate::infra::submissions::SqliteSubmissionStore;

pub mod presence;

pub mod respond;

pub mod staff;

pub mod submissions;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

// Shared state handed to every command.
pub struct Data {
    pub dispatcher: CommandDispatcher<SqliteSubmissionStore>,
}

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        submissions::submit_game(),
        submissions::submissions(),
        submissions::share_link(),
        submissions::remove_submission(),
        submissions::categories(),
        staff::make_mod(),
        staff::make_admin(),
        staff::revoke_mod(),
        staff::revoke_admin(),
        staff::share_title(),
    ]
}
