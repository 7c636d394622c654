// Slash commands for managing staff roles and bot settings.

use super::respond::{display_name, run, send_reply};
use crate::core::dispatch::{BotCommand, Reply};
use crate::core::submissions::Role;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

async fn change_role(
    ctx: Context<'_>,
    user: serenity::User,
    role: Role,
    grant: bool,
) -> Result<(), Error> {
    if user.bot {
        return send_reply(ctx, Reply::private("Bots can't be staff! 🤖")).await;
    }

    let target_id = user.id.get();
    let target_name = display_name(&user);
    let command = if grant {
        BotCommand::GrantRole {
            target_id,
            target_name,
            role,
        }
    } else {
        BotCommand::RevokeRole {
            target_id,
            target_name,
            role,
        }
    };
    run(ctx, command).await
}

/// Give a user the mod role.
#[poise::command(slash_command, guild_only)]
pub async fn make_mod(
    ctx: Context<'_>,
    #[description = "User to promote"] user: serenity::User,
) -> Result<(), Error> {
    change_role(ctx, user, Role::Mod, true).await
}

/// Give a user the admin role. Owner only.
#[poise::command(slash_command, guild_only)]
pub async fn make_admin(
    ctx: Context<'_>,
    #[description = "User to promote"] user: serenity::User,
) -> Result<(), Error> {
    change_role(ctx, user, Role::Admin, true).await
}

/// Take the mod role away from a user.
#[poise::command(slash_command, guild_only)]
pub async fn revoke_mod(
    ctx: Context<'_>,
    #[description = "User to demote"] user: serenity::User,
) -> Result<(), Error> {
    change_role(ctx, user, Role::Mod, false).await
}

/// Take the admin role away from a user. Owner only.
#[poise::command(slash_command, guild_only)]
pub async fn revoke_admin(
    ctx: Context<'_>,
    #[description = "User to demote"] user: serenity::User,
) -> Result<(), Error> {
    change_role(ctx, user, Role::Admin, false).await
}

/// Set the list title used in share links.
#[poise::command(slash_command, guild_only)]
pub async fn share_title(
    ctx: Context<'_>,
    #[description = "New list title"] title: String,
) -> Result<(), Error> {
    run(ctx, BotCommand::SetShareTitle { title }).await
}
