use crate::error::Result;
use crate::gitlab::client::GitlabClient;
use crate::gitlab::models::Commit;
use crate::log_debug;

use regex::Regex;
use std::sync::LazyLock;

static VERSION_BUMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+\.\d+(-\S+)?$").expect("version bump pattern is valid")
});

/// Whether a commit title is nothing but a version number, as written by release tooling
pub fn is_version_bump(title: &str) -> bool {
    VERSION_BUMP.is_match(title)
}

/// Drop version-bump commits, keeping everything else in its original order
pub fn without_version_bumps(commits: Vec<Commit>) -> Vec<Commit> {
    commits
        .into_iter()
        .filter(|commit| !is_version_bump(&commit.title))
        .collect()
}

/// Commits in `(previous, target]`, minus version bumps
pub async fn fetch_commits_between(
    client: &GitlabClient,
    previous: &str,
    target: &str,
) -> Result<Vec<Commit>> {
    let compare = client.compare(previous, target).await?;
    let total = compare.commits.len();
    let commits = without_version_bumps(compare.commits);

    log_debug!(
        "Compare {}..{}: {} commits, {} after dropping version bumps",
        previous,
        target,
        total,
        commits.len()
    );
    Ok(commits)
}
