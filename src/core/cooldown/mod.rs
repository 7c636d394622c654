pub mod cooldown_service;

pub use cooldown_service::{format_remaining, CommandCooldowns, CooldownConfig};
