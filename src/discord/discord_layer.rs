// Discord layer - slash commands and framework hooks.

#[path = "commands/command_catalog.rs"]
pub mod commands;

pub mod errors;

// Re-export command types for convenience
pub use commands::{Context, Data, Error};
