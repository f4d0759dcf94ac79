//! The release announcement run: tags, commits, changelog, card, webhook.

use crate::changelog::{CompletionBackend, OpenAiCompatibleBackend, summarize};
use crate::config::{Config, Delivery};
use crate::error::{HeraldError, Result, Stage};
use crate::gitlab::{GitlabClient, fetch_commits_between, resolve_previous_tag};
use crate::teams::{self, MessageCard};
use crate::{log_debug, log_info, ui};

/// What to announce
#[derive(Clone, Debug)]
pub struct ReleaseRequest {
    /// Version tag, e.g. `v1.4.0`
    pub version: String,
    /// Overrides the project name fetched from the host
    pub project_name: Option<String>,
}

/// Outcome of a successful run
#[derive(Clone, Debug)]
pub struct Announcement {
    pub previous_tag: String,
    pub commit_count: usize,
    pub card: MessageCard,
    /// False for dry runs
    pub delivered: bool,
}

pub struct Pipeline<'a> {
    config: &'a Config,
    http: reqwest::Client,
    gitlab: GitlabClient,
    backend: Box<dyn CompletionBackend>,
}

impl<'a> Pipeline<'a> {
    /// Pipeline talking to the configured OpenAI-compatible backend
    pub fn new(config: &'a Config) -> Result<Self> {
        let http = http_client(config)?;
        let backend = OpenAiCompatibleBackend::new(http.clone(), config.ai.clone());
        Ok(Self::assemble(config, http, Box::new(backend)))
    }

    /// Pipeline with a caller-supplied generation backend
    pub fn with_backend(config: &'a Config, backend: Box<dyn CompletionBackend>) -> Result<Self> {
        let http = http_client(config)?;
        Ok(Self::assemble(config, http, backend))
    }

    fn assemble(
        config: &'a Config,
        http: reqwest::Client,
        backend: Box<dyn CompletionBackend>,
    ) -> Self {
        let gitlab = GitlabClient::new(http.clone(), config.gitlab.clone());
        Self {
            config,
            http,
            gitlab,
            backend,
        }
    }

    /// Run every stage in order. The webhook is only called once everything else succeeded.
    #[tracing::instrument(skip_all, fields(version = %request.version))]
    pub async fn run(&self, request: &ReleaseRequest) -> Result<Announcement> {
        let version = request.version.as_str();

        // Project name and release manager don't depend on each other
        let spinner = ui::create_spinner("Extracting project details and release manager");
        let project_lookup = async {
            match &request.project_name {
                Some(name) => Ok(name.clone()),
                None => self.gitlab.project().await.map(|project| project.name),
            }
        };
        let (project_name, manager) =
            tokio::try_join!(project_lookup, self.gitlab.current_user())
                .inspect_err(|_| spinner.finish_and_clear())?;
        ui::finish_spinner(
            &spinner,
            &format!("Project {project_name}, release manager {}", manager.name),
        );

        let spinner = ui::create_spinner("Resolving previous release tag");
        let previous = resolve_previous_tag(&self.gitlab, version)
            .await
            .inspect_err(|_| spinner.finish_and_clear())?;
        ui::finish_spinner(&spinner, &format!("Previous release: {}", previous.name));

        let spinner = ui::create_spinner("Extracting changed commits");
        let commits = fetch_commits_between(&self.gitlab, &previous.name, version)
            .await
            .inspect_err(|_| spinner.finish_and_clear())?;
        ui::finish_spinner(&spinner, &format!("{} changed commits extracted", commits.len()));

        let spinner = ui::create_spinner("Generating changelog");
        let changelog = summarize(self.backend.as_ref(), &commits, self.config.ai.include_authors)
            .await
            .inspect_err(|_| spinner.finish_and_clear())?;
        ui::finish_spinner(&spinner, "Changelog generated");

        let card = teams::compose(&project_name, version, &changelog, &manager.name);
        log_debug!("Composed card: {}", card.summary);

        let delivered = match &self.config.delivery {
            Delivery::Webhook(url) => {
                let spinner = ui::create_spinner("Sending Teams message");
                teams::send(&self.http, &card, url)
                    .await
                    .inspect_err(|_| spinner.finish_and_clear())?;
                ui::finish_spinner(&spinner, "Teams message sent successfully");
                true
            }
            Delivery::DryRun => {
                log_info!("Dry run, the card was not sent");
                false
            }
        };

        Ok(Announcement {
            previous_tag: previous.name,
            commit_count: commits.len(),
            card,
            delivered,
        })
    }
}

fn http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!("herald/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HeraldError::Upstream {
            stage: Stage::Config,
            status: None,
            message: format!("failed to build HTTP client: {e}"),
        })
}
