// Per-command cooldowns.
//
// Each (command, user) pair may run `max_uses` times inside a rolling
// `window`. The tracker is purely in memory; cooldowns reset on restart.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Expired entries are swept from the tracker once every this many uses.
const SWEEP_EVERY: u64 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownConfig {
    pub max_uses: u32,
    pub window: Duration,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            max_uses: 3,                     // 3 invocations...
            window: Duration::from_secs(30), // ...per 30 seconds
        }
    }
}

pub struct CommandCooldowns {
    config: CooldownConfig,
    // (command name, user id) -> start times of uses inside the window, oldest first
    uses: DashMap<(&'static str, u64), VecDeque<Instant>>,
    attempts: AtomicU64,
}

impl CommandCooldowns {
    pub fn new(config: CooldownConfig) -> Self {
        Self {
            config,
            uses: DashMap::new(),
            attempts: AtomicU64::new(0),
        }
    }

    /// Record a use of `command` by `user_id` if a slot is free.
    ///
    /// Returns the time left until the next slot frees up when the user is on
    /// cooldown. A rejected attempt does not count as a use.
    pub fn try_acquire(&self, command: &'static str, user_id: u64) -> Result<(), Duration> {
        self.try_acquire_at(command, user_id, Instant::now())
    }

    fn try_acquire_at(
        &self,
        command: &'static str,
        user_id: u64,
        now: Instant,
    ) -> Result<(), Duration> {
        // Must run before the entry below is locked.
        if self.attempts.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.sweep(now);
        }

        let mut uses = self.uses.entry((command, user_id)).or_default();

        while let Some(&oldest) = uses.front() {
            if now.saturating_duration_since(oldest) >= self.config.window {
                uses.pop_front();
            } else {
                break;
            }
        }

        if uses.len() >= self.config.max_uses as usize {
            let oldest = uses.front().copied().unwrap_or(now);
            let free_at = oldest + self.config.window;
            return Err(free_at.saturating_duration_since(now));
        }

        uses.push_back(now);
        Ok(())
    }

    /// Drop every (command, user) entry whose uses have all left the window.
    fn sweep(&self, now: Instant) {
        let window = self.config.window;
        self.uses.retain(|_, uses| {
            uses.back()
                .is_some_and(|&newest| now.saturating_duration_since(newest) < window)
        });
    }
}

/// Format a remaining cooldown as seconds with two decimals.
pub fn format_remaining(remaining: Duration) -> String {
    format!("{:.2}", remaining.as_secs_f64())
}
