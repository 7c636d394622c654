// The infra module contains implementations of core traits.

#[path = "submissions/mod.rs"]
pub mod submissions;
