pub mod bot_command;
pub mod command_dispatcher;

pub use bot_command::{BotCommand, Invoker, Reply};
pub use command_dispatcher::{CommandDispatcher, GENERIC_FAILURE};
