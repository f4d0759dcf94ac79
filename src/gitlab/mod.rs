//! Source-control host access: tags, commit ranges, project and user metadata.

mod client;
pub mod commits;
pub mod models;
pub mod tags;

pub use client::{GitlabClient, Page};
pub use commits::{fetch_commits_between, is_version_bump, without_version_bumps};
pub use models::{Commit, CompareResult, Project, Tag, User};
pub use tags::{find_previous_tag, is_semantic_tag, resolve_previous_tag, sort_newest_first};
