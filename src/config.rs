use crate::error::ConfigError;
use crate::log_debug;

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use strum_macros::{Display, EnumString};
use url::Url;

/// Project configuration filename, looked up in the working directory
pub const PROJECT_CONFIG_FILENAME: &str = ".herald.toml";

const DEFAULT_TAGS_PER_PAGE: u32 = 100;
const DEFAULT_COMPARE_PER_PAGE: u32 = 1000;
const DEFAULT_MAX_TAG_PAGES: u32 = 50;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// How the tag list is ordered before the predecessor is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Deserialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum TagOrdering {
    /// Trust the host's newest-first order
    #[default]
    AsReturned,
    /// Sort by creation time, newest first
    Created,
}

/// A credential that must never show up in logs
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"***\"")
    }
}

/// Source-control host settings
#[derive(Clone, Debug)]
pub struct GitlabSettings {
    /// API root, e.g. `https://gitlab.example.com/api/v4`
    pub base_url: Url,
    /// Numeric id or `group/project` slug
    pub project: String,
    pub token: Secret,
    pub tags_per_page: u32,
    pub compare_per_page: u32,
    /// Hard cap on tag pages fetched in one run
    pub max_tag_pages: u32,
    pub tag_ordering: TagOrdering,
}

/// Text-generation backend settings
#[derive(Clone, Debug)]
pub struct AiSettings {
    pub model: String,
    pub api_key: Secret,
    pub base_url: Url,
    /// Ask for a `" — Author Name"` suffix on every changelog line
    pub include_authors: bool,
}

/// Where the finished card goes
#[derive(Clone, PartialEq, Eq)]
pub enum Delivery {
    Webhook(Url),
    /// Print the card instead of posting it
    DryRun,
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Webhook URLs embed their credentials, only the host is safe to show
            Self::Webhook(url) => write!(f, "Webhook({}/***)", url.host_str().unwrap_or("?")),
            Self::DryRun => f.write_str("DryRun"),
        }
    }
}

/// Fully validated runtime configuration, built once per run
#[derive(Clone, Debug)]
pub struct Config {
    pub gitlab: GitlabSettings,
    pub ai: AiSettings,
    pub delivery: Delivery,
    /// Applied to every outbound request
    pub timeout: Duration,
}

/// Optional project file contents. Secrets are only read from the environment.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    pub gitlab_base_url: Option<String>,
    pub gitlab_project_id: Option<String>,
    pub gitlab_project_slug: Option<String>,
    pub teams_webhook_url: Option<String>,
    pub ai_model: Option<String>,
    pub ai_base_url: Option<String>,
    pub include_authors: Option<bool>,
    pub tag_ordering: Option<TagOrdering>,
    pub timeout_seconds: Option<u64>,
    pub tags_per_page: Option<u32>,
    pub compare_per_page: Option<u32>,
    pub max_tag_pages: Option<u32>,
}

impl ProjectConfig {
    /// Load the project file if it exists
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: format!("invalid TOML: {e}"),
        })?;

        log_debug!("Loaded project configuration from {}", path.display());
        Ok(Some(config))
    }
}

/// Settings supplied on the command line, highest precedence
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub include_authors: Option<bool>,
    pub tag_ordering: Option<TagOrdering>,
    pub timeout_seconds: Option<u64>,
    pub dry_run: bool,
}

impl Config {
    /// Load `.env`, the project file and the process environment, then validate
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            log_debug!("Loaded environment from {}", path.display());
        }

        let project = ProjectConfig::load(Path::new(PROJECT_CONFIG_FILENAME))?.unwrap_or_default();
        let env: HashMap<String, String> = std::env::vars().collect();

        Self::resolve(&project, &env, overrides)
    }

    /// Merge the three sources and validate every value
    pub fn resolve<S: std::hash::BuildHasher>(
        project: &ProjectConfig,
        env: &HashMap<String, String, S>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str, fallback: Option<&String>| -> Option<String> {
            env.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .or_else(|| fallback.cloned())
        };

        let base_url = lookup("GITLAB_BASE_URL", project.gitlab_base_url.as_ref());
        let base_url = parse_url("GITLAB_BASE_URL", &require("GITLAB_BASE_URL", base_url)?)?;

        let project_ref = lookup("GITLAB_PROJECT_ID", project.gitlab_project_id.as_ref())
            .or_else(|| lookup("GITLAB_PROJECT_SLUG", project.gitlab_project_slug.as_ref()));
        let project_ref = require("GITLAB_PROJECT_ID", project_ref)?;

        let token = Secret::new(require("GITLAB_TOKEN", lookup("GITLAB_TOKEN", None))?);

        let tag_ordering = match overrides.tag_ordering {
            Some(ordering) => ordering,
            None => match lookup("HERALD_TAG_ORDERING", None) {
                Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    key: "HERALD_TAG_ORDERING",
                    reason: format!("expected 'as-returned' or 'created', got '{value}'"),
                })?,
                None => project.tag_ordering.unwrap_or_default(),
            },
        };

        let gitlab = GitlabSettings {
            base_url,
            project: project_ref,
            token,
            tags_per_page: positive(
                "tags_per_page",
                project.tags_per_page.unwrap_or(DEFAULT_TAGS_PER_PAGE),
            )?,
            compare_per_page: positive(
                "compare_per_page",
                project.compare_per_page.unwrap_or(DEFAULT_COMPARE_PER_PAGE),
            )?,
            max_tag_pages: positive(
                "max_tag_pages",
                project.max_tag_pages.unwrap_or(DEFAULT_MAX_TAG_PAGES),
            )?,
            tag_ordering,
        };

        let model = require("AI_MODEL", lookup("AI_MODEL", project.ai_model.as_ref()))?;
        let api_key = Secret::new(require("AI_API_KEY", lookup("AI_API_KEY", None))?);
        let ai_base_url = lookup("AI_BASE_URL", project.ai_base_url.as_ref());
        let ai_base_url = parse_url("AI_BASE_URL", &require("AI_BASE_URL", ai_base_url)?)?;

        let include_authors = match overrides.include_authors {
            Some(flag) => flag,
            None => match lookup("HERALD_INCLUDE_AUTHORS", None) {
                Some(value) => parse_bool("HERALD_INCLUDE_AUTHORS", &value)?,
                None => project.include_authors.unwrap_or(false),
            },
        };

        let ai = AiSettings {
            model,
            api_key,
            base_url: ai_base_url,
            include_authors,
        };

        let delivery = if overrides.dry_run {
            Delivery::DryRun
        } else {
            let webhook = lookup("TEAMS_WEBHOOK_URL", project.teams_webhook_url.as_ref());
            Delivery::Webhook(parse_url(
                "TEAMS_WEBHOOK_URL",
                &require("TEAMS_WEBHOOK_URL", webhook)?,
            )?)
        };

        let timeout_seconds = match overrides.timeout_seconds {
            Some(seconds) => seconds,
            None => match lookup("HERALD_TIMEOUT_SECONDS", None) {
                Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    key: "HERALD_TIMEOUT_SECONDS",
                    reason: format!("'{value}' is not a number of seconds"),
                })?,
                None => project.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            },
        };
        if timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "HERALD_TIMEOUT_SECONDS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let config = Self {
            gitlab,
            ai,
            delivery,
            timeout: Duration::from_secs(timeout_seconds),
        };
        log_debug!("Configuration resolved: {:?}", config);
        Ok(config)
    }
}

fn require(key: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    value.ok_or(ConfigError::Missing(key))
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            reason: format!("'{value}' is not a boolean"),
        }),
    }
}

fn positive(key: &'static str, value: u32) -> Result<u32, ConfigError> {
    if value == 0 {
        Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        })
    } else {
        Ok(value)
    }
}
