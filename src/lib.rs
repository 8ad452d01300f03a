pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod metrics;
pub mod report;
pub mod window;

use config::{ReportConfig, Settings};
use error::Result;
use github::ActivitySource;
use report::ActivityReport;

/// Validates `settings`, connects to an activity source and builds the report.
///
/// Validation completes before `connect` is called, so a configuration error
/// never reaches the network.
pub async fn run<S, F>(settings: &Settings, connect: F) -> Result<(ReportConfig, ActivityReport)>
where
    S: ActivitySource,
    F: FnOnce(&ReportConfig) -> Result<S>,
{
    let config = ReportConfig::from_settings(settings)?;
    tracing::info!(
        repo_id = %config.repo_id,
        window = %config.window,
        "Collecting activity"
    );

    let source = connect(&config)?;
    let report = fetcher::fetch_and_calculate_report(&source, &config).await?;

    Ok((config, report))
}
