use std::fmt;
use thiserror::Error;

/// A required configuration input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Owner,
    Repo,
    StartDate,
    EndDate,
}

impl ConfigField {
    /// The environment variable the field is read from.
    pub fn env_var(&self) -> &'static str {
        match self {
            ConfigField::Owner => "GITHUB_OWNER",
            ConfigField::Repo => "GITHUB_REPO",
            ConfigField::StartDate => "START_DATE",
            ConfigField::EndDate => "END_DATE",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_var())
    }
}

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("{0} is not set")]
    MissingConfiguration(ConfigField),

    #[error("invalid date: {value} (expected {expected})")]
    InvalidDateFormat {
        value: String,
        expected: &'static str,
    },

    #[error("invalid value for {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("failed to fetch activity: {0}")]
    FetchFailure(#[source] anyhow::Error),
}

impl From<octocrab::Error> for ActivityError {
    fn from(e: octocrab::Error) -> Self {
        ActivityError::FetchFailure(e.into())
    }
}

pub type Result<T> = std::result::Result<T, ActivityError>;
