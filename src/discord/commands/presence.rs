// Bot presence shown in the member list.

use poise::serenity_prelude as serenity;

/// Called once the bot is ready to advertise the submit command.
pub fn on_ready(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::watching("for /submit_game");
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
