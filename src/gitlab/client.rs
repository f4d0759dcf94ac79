use crate::config::GitlabSettings;
use crate::error::{ConfigError, HeraldError, Result, Stage};
use crate::gitlab::models::{CompareResult, Project, Tag, User};
use crate::log_debug;

use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Longest error body kept in an upstream error message
const MAX_ERROR_BODY: usize = 200;

/// One page of a paginated listing
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Next page number, `None` once the host reports the end of the list
    pub next_page: Option<u32>,
}

/// GitLab error bodies look like `{"message": "404 Project Not Found"}`
#[derive(Deserialize)]
struct ErrorBody {
    message: serde_json::Value,
}

/// Thin REST client for the source-control host
#[derive(Clone, Debug)]
pub struct GitlabClient {
    http: reqwest::Client,
    settings: GitlabSettings,
}

impl GitlabClient {
    pub fn new(http: reqwest::Client, settings: GitlabSettings) -> Self {
        Self { http, settings }
    }

    pub fn settings(&self) -> &GitlabSettings {
        &self.settings
    }

    /// `GET /projects/{id}`
    pub async fn project(&self) -> Result<Project> {
        let url = self.project_url(&[])?;
        self.get_json(Stage::ProjectDetails, url).await
    }

    /// `GET /user`, the owner of the access token
    pub async fn current_user(&self) -> Result<User> {
        let url = self.api_url(&["user"])?;
        self.get_json(Stage::ReleaseManager, url).await
    }

    /// `GET /projects/{id}/repository/tags?per_page=N&page=P`
    pub async fn tags_page(&self, page: u32) -> Result<Page<Tag>> {
        let mut url = self.project_url(&["repository", "tags"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &self.settings.tags_per_page.to_string())
            .append_pair("page", &page.to_string());

        let (headers, items): (HeaderMap, Vec<Tag>) = self.get(Stage::Tags, url).await?;

        let next_page = match headers.get("x-next-page") {
            Some(value) => value.to_str().ok().and_then(|v| v.trim().parse().ok()),
            // Without pagination headers a full page means there may be more
            None if items.len() >= usize::try_from(self.settings.tags_per_page).unwrap_or(usize::MAX) => {
                Some(page + 1)
            }
            None => None,
        };

        log_debug!(
            "Fetched tag page {} ({} tags, next page: {:?})",
            page,
            items.len(),
            next_page
        );
        Ok(Page { items, next_page })
    }

    /// `GET /projects/{id}/repository/compare?from=X&to=Y`
    pub async fn compare(&self, from: &str, to: &str) -> Result<CompareResult> {
        let mut url = self.project_url(&["repository", "compare"])?;
        url.query_pairs_mut()
            .append_pair("from", from)
            .append_pair("to", to)
            .append_pair("per_page", &self.settings.compare_per_page.to_string());
        self.get_json(Stage::Compare, url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, stage: Stage, url: Url) -> Result<T> {
        self.get(stage, url).await.map(|(_, body)| body)
    }

    async fn get<T: DeserializeOwned>(&self, stage: Stage, url: Url) -> Result<(HeaderMap, T)> {
        log_debug!("GET {} ({})", url.path(), stage);

        let response = self
            .http
            .get(url)
            .bearer_auth(self.settings.token.expose())
            .send()
            .await
            .map_err(|e| HeraldError::transport(stage, &e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| HeraldError::transport(stage, &e))?;

        if !status.is_success() {
            return Err(HeraldError::Upstream {
                stage,
                status: Some(status.as_u16()),
                message: error_message(&body, status),
            });
        }

        let parsed = serde_json::from_str(&body)
            .map_err(|source| HeraldError::Validation { stage, source })?;
        Ok((headers, parsed))
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::Invalid {
                key: "GITLAB_BASE_URL",
                reason: "URL cannot be used as an API base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Project-scoped URL; the project id is encoded as a single segment so slugs work
    fn project_url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = vec!["projects", self.settings.project.as_str()];
        all.extend_from_slice(segments);
        self.api_url(&all)
    }
}

fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|e| match e.message {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_else(|_| body.trim().to_string());

    if message.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }

    message.chars().take(MAX_ERROR_BODY).collect()
}
