//! Previous-release resolution.
//!
//! The host returns tags newest-first. Among the tags whose names are plain `vX.Y.Z`
//! versions, the predecessor of a release is the entry right after it in that order.

use crate::config::TagOrdering;
use crate::error::{HeraldError, NotFoundError, Result};
use crate::gitlab::client::GitlabClient;
use crate::gitlab::models::Tag;
use crate::log_debug;

use regex::Regex;
use std::cmp::Reverse;
use std::sync::LazyLock;

static SEMANTIC_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+\.\d+\.\d+$").expect("semantic tag pattern is valid"));

/// Whether a tag name is a release tag (`v<major>.<minor>.<patch>`)
pub fn is_semantic_tag(name: &str) -> bool {
    SEMANTIC_TAG.is_match(name)
}

/// Find the release tag that precedes `target` in `tags`
///
/// Non-semantic tags are skipped entirely, wherever they appear.
pub fn find_previous_tag<'a>(
    tags: &'a [Tag],
    target: &str,
) -> std::result::Result<&'a Tag, NotFoundError> {
    let mut semantic = tags.iter().filter(|tag| is_semantic_tag(&tag.name));

    if !semantic.any(|tag| tag.name == target) {
        return Err(NotFoundError::Version(target.to_string()));
    }

    semantic
        .next()
        .ok_or_else(|| NotFoundError::PreviousTag(target.to_string()))
}

/// Stable sort, newest first; tags without any timestamp go last in their original order
pub fn sort_newest_first(tags: &mut [Tag]) {
    tags.sort_by_key(|tag| (tag.created().is_none(), Reverse(tag.created())));
}

/// Walk the tag listing page by page until the predecessor of `target` is known
///
/// With [`TagOrdering::AsReturned`] the walk stops as soon as both tags have been seen.
/// With [`TagOrdering::Created`] every page is fetched and re-sorted first, since a later
/// page could hold a newer tag.
pub async fn resolve_previous_tag(client: &GitlabClient, target: &str) -> Result<Tag> {
    let settings = client.settings();
    let ordering = settings.tag_ordering;
    let mut tags: Vec<Tag> = Vec::new();
    let mut page = 1;
    let mut fetched = 0;

    loop {
        let batch = client.tags_page(page).await?;
        fetched += 1;
        tags.extend(batch.items);

        if ordering == TagOrdering::AsReturned
            && let Ok(previous) = find_previous_tag(&tags, target)
        {
            log_debug!(
                "Resolved {} -> {} after {} page(s)",
                target,
                previous.name,
                fetched
            );
            return Ok(previous.clone());
        }

        match batch.next_page {
            Some(next) if fetched >= settings.max_tag_pages => {
                log_debug!("Stopping before tag page {}: page cap reached", next);
                return Err(HeraldError::PaginationLimit {
                    pages: settings.max_tag_pages,
                });
            }
            Some(next) => page = next,
            None => break,
        }
    }

    log_debug!("Fetched {} tags over {} page(s)", tags.len(), fetched);

    if ordering == TagOrdering::Created {
        sort_newest_first(&mut tags);
    }

    let previous = find_previous_tag(&tags, target)?;
    log_debug!("Resolved {} -> {}", target, previous.name);
    Ok(previous.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::models::Commit;
    use chrono::DateTime;

    fn tag(name: &str) -> Tag {
        Tag {
            name: name.to_string(),
            message: Some(String::new()),
            target_commit_id: None,
            commit: Commit {
                id: "abc123".to_string(),
                short_id: String::new(),
                title: String::new(),
                message: String::new(),
                author_name: String::new(),
                author_email: String::new(),
                created_at: None,
                parent_ids: Vec::new(),
            },
            created_at: None,
        }
    }

    fn tag_at(name: &str, created: &str) -> Tag {
        Tag {
            created_at: Some(DateTime::parse_from_rfc3339(created).expect("valid timestamp")),
            ..tag(name)
        }
    }

    #[test]
    fn test_previous_is_next_entry() {
        let tags = vec![tag("v1.1.1"), tag("v1.1.0")];
        let previous = find_previous_tag(&tags, "v1.1.1").expect("predecessor exists");
        assert_eq!(previous.name, "v1.1.0");
    }

    #[test]
    fn test_target_missing() {
        let tags = vec![tag("v1.1.0")];
        assert_eq!(
            find_previous_tag(&tags, "v1.1.1"),
            Err(NotFoundError::Version("v1.1.1".to_string()))
        );
    }

    #[test]
    fn test_target_is_oldest() {
        let tags = vec![tag("v1.1.0")];
        assert_eq!(
            find_previous_tag(&tags, "v1.1.0"),
            Err(NotFoundError::PreviousTag("v1.1.0".to_string()))
        );
    }

    #[test]
    fn test_non_semantic_tags_never_selected() {
        let tags = vec![
            tag("latest"),
            tag("v2.0.0"),
            tag("staging-1"),
            tag("v2.0.0-rc1"),
            tag("release-1.9"),
            tag("v1.9.0"),
        ];
        let previous = find_previous_tag(&tags, "v2.0.0").expect("predecessor exists");
        assert_eq!(previous.name, "v1.9.0");
    }

    #[test]
    fn test_non_semantic_target_is_not_found() {
        let tags = vec![tag("latest"), tag("v1.0.0")];
        assert_eq!(
            find_previous_tag(&tags, "latest"),
            Err(NotFoundError::Version("latest".to_string()))
        );
    }

    #[test]
    fn test_semantic_pattern() {
        assert!(is_semantic_tag("v10.20.30"));
        assert!(!is_semantic_tag("1.2.3"));
        assert!(!is_semantic_tag("v1.2"));
        assert!(!is_semantic_tag("v1.2.3-beta"));
        assert!(!is_semantic_tag("v1.2.3 "));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut tags = vec![
            tag_at("v1.0.0", "2024-01-01T00:00:00Z"),
            tag("v0.9.0"),
            tag_at("v1.2.0", "2024-03-01T00:00:00+01:00"),
            tag_at("v1.1.0", "2024-02-01T00:00:00Z"),
        ];
        sort_newest_first(&mut tags);
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["v1.2.0", "v1.1.0", "v1.0.0", "v0.9.0"]);
    }

    #[test]
    fn test_sort_falls_back_to_commit_time() {
        let mut lightweight = tag("v1.1.0");
        lightweight.commit.created_at =
            Some(DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z").expect("valid timestamp"));
        let mut tags = vec![tag_at("v1.0.0", "2024-01-01T00:00:00Z"), lightweight];
        sort_newest_first(&mut tags);
        assert_eq!(tags[0].name, "v1.1.0");
    }
}
