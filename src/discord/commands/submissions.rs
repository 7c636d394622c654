// Slash commands for submitting and browsing games.
//
// This layer is THIN - arguments are converted and passed straight to the
// dispatcher.

use super::respond::run;
use crate::core::dispatch::BotCommand;
use crate::core::submissions::CategoryName;
use crate::discord::{Context, Error};

/// Category picker shown by Discord. Mirrors the core taxonomy.
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum CategoryChoice {
    #[name = "action"]
    Action,
    #[name = "adventure"]
    Adventure,
    #[name = "casual"]
    Casual,
    #[name = "fighting"]
    Fighting,
    #[name = "horror"]
    Horror,
    #[name = "indie"]
    Indie,
    #[name = "platformer"]
    Platformer,
    #[name = "puzzle"]
    Puzzle,
    #[name = "racing"]
    Racing,
    #[name = "rpg"]
    Rpg,
    #[name = "shooter"]
    Shooter,
    #[name = "simulation"]
    Simulation,
    #[name = "sports"]
    Sports,
    #[name = "strategy"]
    Strategy,
}

impl From<CategoryChoice> for CategoryName {
    fn from(value: CategoryChoice) -> Self {
        match value {
            CategoryChoice::Action => CategoryName::Action,
            CategoryChoice::Adventure => CategoryName::Adventure,
            CategoryChoice::Casual => CategoryName::Casual,
            CategoryChoice::Fighting => CategoryName::Fighting,
            CategoryChoice::Horror => CategoryName::Horror,
            CategoryChoice::Indie => CategoryName::Indie,
            CategoryChoice::Platformer => CategoryName::Platformer,
            CategoryChoice::Puzzle => CategoryName::Puzzle,
            CategoryChoice::Racing => CategoryName::Racing,
            CategoryChoice::Rpg => CategoryName::Rpg,
            CategoryChoice::Shooter => CategoryName::Shooter,
            CategoryChoice::Simulation => CategoryName::Simulation,
            CategoryChoice::Sports => CategoryName::Sports,
            CategoryChoice::Strategy => CategoryName::Strategy,
        }
    }
}

/// Submit a Steam game for a future stream.
///
/// Only works in the game submissions channel.
#[poise::command(slash_command, guild_only)]
pub async fn submit_game(
    ctx: Context<'_>,
    #[description = "Steam store link, e.g. https://store.steampowered.com/app/441620/"]
    url: String,
    #[description = "Which category the game fits best"] category: CategoryChoice,
) -> Result<(), Error> {
    run(
        ctx,
        BotCommand::SubmitGame {
            url,
            category: category.into(),
        },
    )
    .await
}

/// List submitted games, optionally for a single category.
#[poise::command(slash_command, guild_only)]
pub async fn submissions(
    ctx: Context<'_>,
    #[description = "Only show this category"] category: Option<CategoryChoice>,
) -> Result<(), Error> {
    run(
        ctx,
        BotCommand::ListSubmissions {
            category: category.map(Into::into),
        },
    )
    .await
}

/// Build a share link for the submitted games.
#[poise::command(slash_command, guild_only)]
pub async fn share_link(
    ctx: Context<'_>,
    #[description = "Only include this category"] category: Option<CategoryChoice>,
) -> Result<(), Error> {
    run(
        ctx,
        BotCommand::ShareLink {
            category: category.map(Into::into),
        },
    )
    .await
}

/// Remove a submission by its Steam app id.
#[poise::command(slash_command, guild_only)]
pub async fn remove_submission(
    ctx: Context<'_>,
    #[description = "Steam app id of the game"] appid: u64,
) -> Result<(), Error> {
    run(ctx, BotCommand::RemoveSubmission { appid }).await
}

/// Show every category and how many games are in it.
#[poise::command(slash_command, guild_only)]
pub async fn categories(ctx: Context<'_>) -> Result<(), Error> {
    run(ctx, BotCommand::ListCategories).await
}
