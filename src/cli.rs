use crate::config::{Config, ConfigOverrides, TagOrdering};
use crate::error::HeraldError;
use crate::gitlab::is_semantic_tag;
use crate::logger::DEFAULT_LOG_FILE;
use crate::manifest;
use crate::pipeline::{Pipeline, ReleaseRequest};
use crate::{log_debug, log_error, log_warn, ui};

use anyhow::Context;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, crate_version};
use std::path::PathBuf;
use std::process::ExitCode;

/// Announce a release: changelog since the previous tag, posted to a Teams channel
#[derive(Parser, Debug)]
#[command(
    author,
    version = crate_version!(),
    about = "Herald: AI changelog and release announcement for GitLab projects",
    long_about = "Herald finds the previous semantic-version tag, summarizes the commits since then with a language model, and posts a message card to a Teams webhook.",
    disable_version_flag = true,
    styles = get_styles(),
)]
pub struct Cli {
    /// Project name shown on the card (defaults to the GitLab project name)
    #[arg(value_name = "PROJECT")]
    pub project_name: Option<String>,

    /// Version tag to announce (defaults to the manifest version)
    #[arg(value_name = "TAG")]
    pub tag: Option<String>,

    /// Manifest file or directory to read the version from
    #[arg(long, value_name = "PATH", help = "Manifest file or directory to read the version from")]
    pub manifest: Option<PathBuf>,

    /// Suffix each changelog line with its author
    #[arg(long, help = "Suffix each changelog line with its author")]
    pub with_authors: bool,

    /// How tags are ordered before picking the previous release
    #[arg(long, value_name = "ORDERING", value_parser = tag_ordering_parser)]
    pub tag_ordering: Option<TagOrdering>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS", help = "Per-request timeout in seconds")]
    pub timeout: Option<u64>,

    /// Print the message card instead of sending it
    #[arg(long, help = "Print the message card instead of sending it")]
    pub dry_run: bool,

    /// Log debug messages to a file
    #[arg(short = 'l', long = "log", help = "Log debug messages to a file")]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(long = "log-file", help = "Specify a custom log file path")]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, progress lines)
    #[arg(short = 'q', long = "quiet", help = "Suppress non-essential output")]
    pub quiet: bool,

    /// Display the version
    #[arg(short = 'v', long = "version", help = "Display the version")]
    pub version: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            include_authors: self.with_authors.then_some(true),
            tag_ordering: self.tag_ordering,
            timeout_seconds: self.timeout,
            dry_run: self.dry_run,
        }
    }

    /// The positional variant takes `PROJECT TAG`; otherwise the tag comes from the manifest
    pub fn release_request(&self) -> crate::error::Result<ReleaseRequest> {
        let version = match &self.tag {
            Some(tag) => tag.clone(),
            None => manifest::version_tag_from(self.manifest.as_deref())?,
        };
        Ok(ReleaseRequest {
            version,
            project_name: self.project_name.clone(),
        })
    }

    /// A lone positional that reads like `vX.Y.Z` was most likely meant as the tag
    pub fn tag_given_as_project(&self) -> Option<&str> {
        match (&self.project_name, &self.tag) {
            (Some(project), None) if is_semantic_tag(project) => Some(project),
            _ => None,
        }
    }
}

fn tag_ordering_parser(s: &str) -> Result<TagOrdering, String> {
    s.parse()
        .map_err(|_| format!("Invalid tag ordering '{s}'. Expected one of: as-returned, created"))
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Blue.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Entry point: parse arguments, run the pipeline, map the outcome to an exit code
pub async fn main() -> ExitCode {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return ExitCode::SUCCESS;
    }

    if let Err(e) = setup_logging(&cli) {
        ui::print_error(&format!("Failed to set up logging: {e:#}"));
        return ExitCode::FAILURE;
    }

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    match announce(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error!("Run failed: {:#}", e);
            ui::print_error(&format!("❌ Failed to announce release: {e:#}"));
            ExitCode::from(failure_code(&e))
        }
    }
}

/// Exit code for a failed run; errors raised outside the pipeline use the generic failure code
fn failure_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<HeraldError>()
        .map_or(1, HeraldError::exit_code)
}

fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    crate::logger::init().map_err(anyhow::Error::msg)?;

    // A custom log file implies --log
    if cli.log || cli.log_file.is_some() {
        let log_file = cli.log_file.as_deref().unwrap_or(DEFAULT_LOG_FILE);
        crate::logger::set_log_file(log_file)
            .with_context(|| format!("cannot open log file {log_file}"))?;
    } else {
        crate::logger::disable_logging();
    }
    Ok(())
}

async fn announce(cli: &Cli) -> anyhow::Result<()> {
    ui::print_intro("Herald changelog generator");

    let config = Config::load(&cli.overrides()).context("configuration")?;

    if let Some(project) = cli.tag_given_as_project() {
        log_warn!("Project name {} looks like a version tag", project);
        ui::print_warning(&format!(
            "'{project}' is used as the project name; pass `herald <PROJECT> {project}` to announce that tag"
        ));
    }

    let request = cli.release_request().context("version lookup")?;
    ui::print_info(&format!("Release version: {}", request.version));

    let pipeline = Pipeline::new(&config)?;
    let announcement = pipeline.run(&request).await.map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("{stage} failed for {}", request.version))
    })?;

    log_debug!(
        "Announced {} ({} commits since {})",
        request.version,
        announcement.commit_count,
        announcement.previous_tag
    );

    if announcement.delivered {
        ui::print_success("✅ Release announcement sent successfully!");
    } else {
        let json = serde_json::to_string_pretty(&announcement.card)?;
        ui::print_bordered_content(&json);
        if ui::is_quiet_mode() {
            println!("{json}");
        }
        ui::print_warning("Dry run: the message card was not sent");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_variant() {
        let cli = Cli::parse_from(["herald", "My Project", "v1.2.3"]);
        let request = cli.release_request().expect("tag given explicitly");
        assert_eq!(request.version, "v1.2.3");
        assert_eq!(request.project_name.as_deref(), Some("My Project"));
    }

    #[test]
    fn test_lone_version_positional_is_flagged() {
        let cli = Cli::parse_from(["herald", "v1.2.3"]);
        assert_eq!(cli.tag_given_as_project(), Some("v1.2.3"));
        assert_eq!(cli.project_name.as_deref(), Some("v1.2.3"));
        assert_eq!(cli.tag, None);

        let cli = Cli::parse_from(["herald", "Storefront"]);
        assert_eq!(cli.tag_given_as_project(), None);

        let cli = Cli::parse_from(["herald", "v1.2.3", "v1.2.3"]);
        assert_eq!(cli.tag_given_as_project(), None);
    }

    #[test]
    fn test_failure_code_comes_from_the_pipeline_error() {
        let err = anyhow::Error::new(HeraldError::Delivery {
            status: Some(500),
            status_text: "Internal Server Error".to_string(),
        })
        .context("webhook delivery failed for v1.0.0");
        assert_eq!(failure_code(&err), 1);
        assert_eq!(failure_code(&anyhow::anyhow!("configuration")), 1);
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::parse_from([
            "herald",
            "--with-authors",
            "--tag-ordering",
            "created",
            "--timeout",
            "5",
            "--dry-run",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.include_authors, Some(true));
        assert_eq!(overrides.tag_ordering, Some(TagOrdering::Created));
        assert_eq!(overrides.timeout_seconds, Some(5));
        assert!(overrides.dry_run);
    }

    #[test]
    fn test_authors_flag_absent_defers_to_config() {
        let cli = Cli::parse_from(["herald"]);
        assert_eq!(cli.overrides().include_authors, None);
    }

    #[test]
    fn test_invalid_tag_ordering_rejected() {
        assert!(Cli::try_parse_from(["herald", "--tag-ordering", "alphabetical"]).is_err());
    }
}
