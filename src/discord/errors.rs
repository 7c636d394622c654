// Framework-level error hook.

use crate::core::dispatch::GENERIC_FAILURE;
use crate::discord::{Data, Error};

/// Log command failures and answer with a generic message instead of
/// leaking error details into the channel.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                command = %ctx.command().qualified_name,
                user_id = ctx.author().id.get(),
                error = %error,
                "Command failed"
            );
            let reply = poise::CreateReply::default()
                .content(GENERIC_FAILURE)
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::warn!("Failed to send error reply: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling framework error: {}", e);
            }
        }
    }
}
