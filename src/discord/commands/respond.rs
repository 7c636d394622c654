// Glue between poise contexts and the transport-independent dispatcher.

use crate::core::dispatch::{BotCommand, Invoker, Reply};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Discord rejects message content longer than this.
const MESSAGE_LIMIT: usize = 2000;

/// Name shown for a user: their global display name, else their username.
pub fn display_name(user: &serenity::User) -> String {
    user.global_name
        .clone()
        .unwrap_or_else(|| user.name.clone())
}

fn invoker(ctx: Context<'_>) -> Invoker {
    Invoker {
        user_id: ctx.author().id.get(),
        display_name: display_name(ctx.author()),
        channel_id: ctx.channel_id().get(),
    }
}

/// Dispatch `command` on behalf of the invoking user and send the reply.
pub async fn run(ctx: Context<'_>, command: BotCommand) -> Result<(), Error> {
    let reply = ctx.data().dispatcher.dispatch(&invoker(ctx), command).await;
    send_reply(ctx, reply).await
}

pub async fn send_reply(ctx: Context<'_>, reply: Reply) -> Result<(), Error> {
    for chunk in split_message(&reply.text, MESSAGE_LIMIT) {
        ctx.send(
            poise::CreateReply::default()
                .content(chunk)
                .ephemeral(reply.private),
        )
        .await?;
    }
    Ok(())
}

/// Split `text` into messages of at most `limit` characters, breaking on
/// line boundaries where possible.
fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if current_len > 0 && current_len + 1 + line_len > limit {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            // A single line that can't fit anywhere gets hard-wrapped.
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if current_len > 0 {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if current_len > 0 || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}
