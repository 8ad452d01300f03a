//! Configuration loading and validation.
//!
//! `Settings` mirrors the environment (optionally seeded from a `.env` file)
//! with every field optional, so that an absent variable is reported as the
//! specific missing field rather than a generic deserialization error.
//! `ReportConfig` is the validated form passed to the rest of the crate.

use crate::error::{ActivityError, ConfigField, Result};
use crate::github::IssueState;
use crate::report::ReportFormat;
use crate::window::ReportWindow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Raw settings as read from environment variables.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Settings {
    pub github_owner: Option<String>,
    pub github_repo: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,

    /// Optional GitHub Personal Access Token for higher rate limits.
    pub github_token: Option<String>,

    /// Lifecycle filter for the issue listing: "open", "closed" or "all".
    pub issue_state: Option<String>,

    /// Hard limit on the number of paginated requests per endpoint.
    #[serde(default = "default_max_pages")]
    pub max_github_api_pages: u32,

    /// Report rendering: "text" or "json".
    pub report_format: Option<String>,
}

fn default_max_pages() -> u32 {
    50
}

impl Settings {
    pub fn from_env() -> std::result::Result<Self, envy::Error> {
        envy::from_env()
    }
}

/// Validated configuration for a single report run.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub repo_id: RepoId,
    pub window: ReportWindow,
    pub github_token: Option<String>,
    pub issue_state: IssueState,
    pub max_github_api_pages: u32,
    pub report_format: ReportFormat,
}

impl ReportConfig {
    /// Validates `settings`, failing on the first missing or malformed input.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let owner = required(&settings.github_owner, ConfigField::Owner)?;
        let repo = required(&settings.github_repo, ConfigField::Repo)?;
        let window = ReportWindow::from_dates(
            settings.start_date.as_deref(),
            settings.end_date.as_deref(),
        )?;

        let issue_state = match non_blank(&settings.issue_state) {
            Some(s) => s.parse()?,
            None => IssueState::default(),
        };
        let report_format = match non_blank(&settings.report_format) {
            Some(s) => s.parse()?,
            None => ReportFormat::default(),
        };

        if settings.max_github_api_pages == 0 {
            return Err(ActivityError::InvalidSetting {
                name: "MAX_GITHUB_API_PAGES",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            repo_id: RepoId { owner, repo },
            window,
            github_token: non_blank(&settings.github_token).map(str::to_string),
            issue_state,
            max_github_api_pages: settings.max_github_api_pages,
            report_format,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required(value: &Option<String>, field: ConfigField) -> Result<String> {
    non_blank(value)
        .map(str::to_string)
        .ok_or(ActivityError::MissingConfiguration(field))
}
