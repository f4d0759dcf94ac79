//! Error types shared by every pipeline stage.
//!
//! Every error is terminal for a run. Library code returns [`HeraldError`] and only the
//! binary decides how to report it and which exit code to use.

use strum_macros::Display;
use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, HeraldError>;

/// The pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    #[strum(to_string = "configuration")]
    Config,
    #[strum(to_string = "manifest")]
    Manifest,
    #[strum(to_string = "project details")]
    ProjectDetails,
    #[strum(to_string = "tag listing")]
    Tags,
    #[strum(to_string = "tag compare")]
    Compare,
    #[strum(to_string = "release manager")]
    ReleaseManager,
    #[strum(to_string = "changelog generation")]
    Changelog,
    #[strum(to_string = "webhook delivery")]
    Webhook,
}

/// A required or malformed setting
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not provided")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("failed to read {path}: {reason}")]
    File { path: String, reason: String },
}

/// The target version or its predecessor could not be located
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("version not found: {0}")]
    Version(String),
    #[error("previous tag not found for {0}")]
    PreviousTag(String),
}

#[derive(Debug, Error)]
pub enum HeraldError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unexpected {stage} response shape: {source}")]
    Validation {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("{stage} request failed{}: {message}", format_status(.status))]
    Upstream {
        stage: Stage,
        status: Option<u16>,
        message: String,
    },

    #[error("failed to generate changelog: {0}")]
    Generation(String),

    #[error("webhook returned status {}: {status_text}", format_status_code(.status))]
    Delivery {
        status: Option<u16>,
        status_text: String,
    },

    #[error("failed to read version from {path}: {reason}")]
    Manifest { path: String, reason: String },

    #[error("tag listing did not finish within {pages} pages")]
    PaginationLimit { pages: u32 },
}

impl HeraldError {
    /// Stage the error should be reported against
    pub fn stage(&self) -> Stage {
        match self {
            Self::Config(_) => Stage::Config,
            Self::Validation { stage, .. } | Self::Upstream { stage, .. } => *stage,
            Self::NotFound(_) | Self::PaginationLimit { .. } => Stage::Tags,
            Self::Generation(_) => Stage::Changelog,
            Self::Delivery { .. } => Stage::Webhook,
            Self::Manifest { .. } => Stage::Manifest,
        }
    }

    /// Build an upstream error from a transport failure, timeouts included
    pub(crate) fn transport(stage: Stage, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        Self::Upstream {
            stage,
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }

    /// Process exit code for this error; every failure ends the run the same way
    pub const fn exit_code(&self) -> u8 {
        1
    }
}

#[allow(clippy::ref_option)]
fn format_status(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" with status {s}"))
}

#[allow(clippy::ref_option)]
fn format_status_code(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_variable() {
        let err = HeraldError::from(ConfigError::Missing("GITLAB_TOKEN"));
        assert_eq!(err.to_string(), "GITLAB_TOKEN not provided");
        assert_eq!(err.stage(), Stage::Config);
    }

    #[test]
    fn test_delivery_error_carries_status() {
        let err = HeraldError::Delivery {
            status: Some(500),
            status_text: "Internal Server Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "webhook returned status 500: Internal Server Error"
        );
        assert_eq!(err.stage(), Stage::Webhook);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_upstream_error_message() {
        let err = HeraldError::Upstream {
            stage: Stage::Compare,
            status: Some(404),
            message: "404 Project Not Found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "tag compare request failed with status 404: 404 Project Not Found"
        );
    }

    #[test]
    fn test_not_found_reports_tag_stage() {
        let err = HeraldError::from(NotFoundError::PreviousTag("v1.0.0".to_string()));
        assert_eq!(err.stage(), Stage::Tags);
        assert_eq!(err.to_string(), "previous tag not found for v1.0.0");
    }
}
