// Core submissions module - game submission intake, roles and categories.

pub mod share_link;
pub mod steam_link;
pub mod submission_models;
pub mod submission_service;
pub mod submission_store;

pub use steam_link::LinkError;
pub use submission_models::*;
pub use submission_service::{SubmissionError, SubmissionRules, SubmissionService};
pub use submission_store::{StoreError, SubmissionStore};
