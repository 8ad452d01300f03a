//! Report assembly and rendering.

use crate::config::RepoId;
use crate::error::ActivityError;
use crate::window::ReportWindow;
use serde::Serialize;
use std::str::FromStr;

const RULE: &str = "-------------------------------------------------------------";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(ActivityError::InvalidSetting {
                name: "REPORT_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Activity summary for one repository over one window.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ActivityReport {
    pub repo: RepoId,
    pub window: ReportWindow,
    pub commit_count: usize,
    /// Closed issues and pull requests.
    pub issue_count: usize,
    pub open_issue_count: usize,
    pub average_close_seconds: Option<f64>,
}

impl ActivityReport {
    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => serde_json::to_string_pretty(self),
        }
    }

    pub fn render_text(&self) -> String {
        let average = match self.average_close_seconds {
            Some(secs) => format!("{secs}s"),
            None => "n/a".to_string(),
        };

        format!(
            "{RULE}\n\
             GitHub activity for {repo}\n\
             Window: {window} (+09:00 calendar days)\n\
             Commits: {commits}\n\
             Closed issues/PRs: {closed}\n\
             Still open: {open}\n\
             Average time to close: {average}\n\
             {RULE}",
            repo = self.repo,
            window = self.window,
            commits = self.commit_count,
            closed = self.issue_count,
            open = self.open_issue_count,
        )
    }
}
