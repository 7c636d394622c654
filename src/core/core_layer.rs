// The core module contains all business logic.
// Nothing in here knows about Discord.

#[path = "submissions/mod.rs"]
pub mod submissions;

#[path = "cooldown/mod.rs"]
pub mod cooldown;

#[path = "dispatch/mod.rs"]
pub mod dispatch;
