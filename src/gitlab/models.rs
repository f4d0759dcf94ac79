use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A commit as returned by the tag and compare endpoints
///
/// Only `id`, `title` and `message` are required; everything else is optional so that
/// trimmed-down responses still validate.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Commit {
    pub id: String,
    #[serde(default)]
    pub short_id: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub parent_ids: Vec<String>,
}

/// A repository tag
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    /// Annotation message, null for lightweight tags
    #[serde(default)]
    pub message: Option<String>,
    /// Id of the object the tag points at
    #[serde(default, rename = "target")]
    pub target_commit_id: Option<String>,
    pub commit: Commit,
    /// Set by the host for annotated tags only
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl Tag {
    /// Creation time used for ordering: the tag's own timestamp, else its commit's
    pub fn created(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at.or(self.commit.created_at)
    }
}

/// Body of the repository compare endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct CompareResult {
    pub commits: Vec<Commit>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Project {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub name: String,
}
