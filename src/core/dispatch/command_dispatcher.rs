// Command dispatcher - the boundary between the chat frontend and the rules engine.
//
// Every invocation goes through the same steps:
// 1. Cooldown check (nothing else runs while a caller is on cooldown)
// 2. Access check for the command
// 3. Rules engine call
// 4. Outcome -> reply text
//
// Internal failures are logged here and replaced by one generic reply, so
// nothing from the store ever reaches the caller verbatim.

use super::bot_command::{BotCommand, Invoker, Reply};
use crate::core::cooldown::{format_remaining, CommandCooldowns};
use crate::core::submissions::{
    AccessLevel, CategoryCount, CategoryName, LinkError, Role, RoleChange, Submission,
    SubmissionError, SubmissionService, SubmissionStore, SubmitOutcome,
};

pub const GENERIC_FAILURE: &str = "❌ Something went wrong while running that command. Please try again later.";

pub struct CommandDispatcher<S: SubmissionStore> {
    service: SubmissionService<S>,
    cooldowns: CommandCooldowns,
}

impl<S: SubmissionStore> CommandDispatcher<S> {
    pub fn new(service: SubmissionService<S>, cooldowns: CommandCooldowns) -> Self {
        Self { service, cooldowns }
    }

    #[cfg(test)]
    pub fn service(&self) -> &SubmissionService<S> {
        &self.service
    }

    /// Run a command for `invoker` and produce the reply to send back.
    pub async fn dispatch(&self, invoker: &Invoker, command: BotCommand) -> Reply {
        let name = command.name();

        if let Err(remaining) = self.cooldowns.try_acquire(name, invoker.user_id) {
            tracing::debug!(
                command = name,
                user_id = invoker.user_id,
                "Command on cooldown"
            );
            return Reply::private(format!(
                "⏳ `/{}` is on cooldown. Try again in {}s.",
                name,
                format_remaining(remaining)
            ));
        }

        match self.execute(invoker, command).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(
                    command = name,
                    user_id = invoker.user_id,
                    error = %err,
                    "Command failed"
                );
                Reply::private(GENERIC_FAILURE)
            }
        }
    }

    async fn execute(
        &self,
        invoker: &Invoker,
        command: BotCommand,
    ) -> Result<Reply, SubmissionError> {
        let required = command.required_access();
        if !self.service.authorize(invoker.user_id, required).await? {
            return Ok(forbidden(required));
        }

        match command {
            BotCommand::SubmitGame { url, category } => {
                let outcome = self
                    .service
                    .submit(
                        invoker.user_id,
                        &invoker.display_name,
                        invoker.channel_id,
                        &url,
                        category,
                    )
                    .await?;
                Ok(self.submit_reply(outcome))
            }
            BotCommand::ListSubmissions { category } => {
                let submissions = self.service.list_submissions(category).await?;
                Ok(Reply::public(format_submissions(category, &submissions)))
            }
            BotCommand::ShareLink { category } => {
                match self.service.share_link(category).await? {
                    Some(link) => Ok(Reply::public(link)),
                    None => Ok(Reply::private(empty_list_text(category))),
                }
            }
            BotCommand::RemoveSubmission { appid } => {
                if self.service.remove_submission(appid).await? {
                    Ok(Reply::private(format!(
                        "🗑️ Removed the submission for app `{}`.",
                        appid
                    )))
                } else {
                    Ok(Reply::private(format!(
                        "No submission found for app `{}`.",
                        appid
                    )))
                }
            }
            BotCommand::ListCategories => {
                let categories = self.service.list_categories().await?;
                Ok(Reply::public(format_categories(&categories)))
            }
            BotCommand::GrantRole {
                target_id,
                target_name,
                role,
            } => {
                let change = self
                    .service
                    .grant_role(invoker.user_id, target_id, &target_name, role)
                    .await?;
                Ok(role_reply(change, role, true))
            }
            BotCommand::RevokeRole {
                target_id,
                target_name,
                role,
            } => {
                let change = self
                    .service
                    .revoke_role(invoker.user_id, target_id, &target_name, role)
                    .await?;
                Ok(role_reply(change, role, false))
            }
            BotCommand::SetShareTitle { title } => match self.service.set_share_title(&title).await
            {
                Ok(title) => Ok(Reply::private(format!(
                    "✅ Share links will now use the title **{}**.",
                    title
                ))),
                Err(SubmissionError::InvalidSetting(reason)) => {
                    Ok(Reply::private(format!("❌ {}.", reason)))
                }
                Err(err) => Err(err),
            },
        }
    }

    fn submit_reply(&self, outcome: SubmitOutcome) -> Reply {
        match outcome {
            SubmitOutcome::Accepted(submission) => Reply::private(format!(
                "✅ Submitted <{}> (app `{}`) under **{}**.",
                submission.url, submission.appid, submission.category
            )),
            SubmitOutcome::RejectedWrongChannel => Reply::private(format!(
                "This command can only be run in <#{}>.",
                self.service.rules().submissions_channel_id
            )),
            SubmitOutcome::RejectedInvalidLink(err) => Reply::private(link_guidance(&err)),
            SubmitOutcome::RejectedDuplicate { .. } => {
                Reply::private("That game has already been submitted.")
            }
        }
    }
}

fn forbidden(required: AccessLevel) -> Reply {
    Reply::private(format!(
        "🚫 You need **{}** access to use this command.",
        required
    ))
}

fn link_guidance(err: &LinkError) -> String {
    let hint = "Use a Steam store link like `https://store.steampowered.com/app/441620/`.";
    match err {
        LinkError::Malformed(_) | LinkError::UnsupportedScheme(_) => {
            format!("❌ That doesn't look like a web link. {}", hint)
        }
        LinkError::UnrecognizedHost(host) => {
            format!("❌ `{}` isn't a Steam site. {}", host, hint)
        }
        LinkError::MissingAppId => {
            format!("❌ Couldn't find an app id in that link. {}", hint)
        }
    }
}

fn role_reply(change: RoleChange, role: Role, granted: bool) -> Reply {
    match change {
        RoleChange::Forbidden { required } => forbidden(required),
        RoleChange::Changed(user) if granted => {
            Reply::public(format!("✅ **{}** is now a {}.", user.username, role))
        }
        RoleChange::Changed(user) => {
            Reply::public(format!("✅ **{}** is no longer a {}.", user.username, role))
        }
        RoleChange::Unchanged(user) if granted => {
            Reply::private(format!("**{}** is already a {}.", user.username, role))
        }
        RoleChange::Unchanged(user) => {
            Reply::private(format!("**{}** isn't a {}.", user.username, role))
        }
    }
}

fn empty_list_text(category: Option<CategoryName>) -> String {
    match category {
        Some(category) => format!("No submissions in **{}** yet.", category),
        None => "No submissions yet.".to_string(),
    }
}

fn format_submissions(category: Option<CategoryName>, submissions: &[Submission]) -> String {
    if submissions.is_empty() {
        return empty_list_text(category);
    }

    let heading = match category {
        Some(category) => format!(
            "🎮 **{} submission(s) in {}**",
            submissions.len(),
            category
        ),
        None => format!("🎮 **{} submission(s)**", submissions.len()),
    };

    let lines = submissions
        .iter()
        .map(|s| {
            format!(
                "• `{}` [{}] <{}> by {}",
                s.appid, s.category, s.url, s.submitted_by
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n{}", heading, lines)
}

fn format_categories(categories: &[CategoryCount]) -> String {
    if categories.is_empty() {
        return "No categories yet.".to_string();
    }

    let lines = categories
        .iter()
        .map(|c| format!("• **{}** ({})", c.category.name, c.submissions))
        .collect::<Vec<_>>()
        .join("\n");

    format!("📁 **Categories**\n{}", lines)
}
