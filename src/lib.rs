//! Herald - release announcements for GitLab projects
//!
//! Finds the previous semantic-version tag of a release, summarizes the commits in
//! between with a language model, and posts the result to a Teams channel as a message card.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod gitlab;
pub mod logger;
pub mod manifest;
pub mod pipeline;
pub mod teams;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use error::{ConfigError, HeraldError, NotFoundError, Result, Stage};
pub use pipeline::{Announcement, Pipeline, ReleaseRequest};
