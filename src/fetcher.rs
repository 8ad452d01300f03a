use crate::config::ReportConfig;
use crate::error::Result;
use crate::github::ActivitySource;
use crate::metrics;
use crate::report::ActivityReport;

/// Fetches commits and issues for the configured window and aggregates them.
///
/// The two listings run one after the other; a failure in either aborts the
/// report without partial results.
pub async fn fetch_and_calculate_report<S>(source: &S, config: &ReportConfig) -> Result<ActivityReport>
where
    S: ActivitySource + ?Sized,
{
    let repo_id = &config.repo_id;
    let window = &config.window;

    let commits = source.fetch_commits(repo_id, window).await?;
    tracing::info!(repo_id = %repo_id, count = commits.len(), "Fetched commits");

    let issues = source
        .fetch_issues(repo_id, window, config.issue_state)
        .await?;
    tracing::info!(
        repo_id = %repo_id,
        state = %config.issue_state,
        count = issues.len(),
        "Fetched issues"
    );

    let metrics = metrics::aggregate(&issues);
    tracing::debug!(?metrics, "Aggregated close latency");

    Ok(ActivityReport {
        repo: repo_id.clone(),
        window: *window,
        commit_count: commits.len(),
        issue_count: metrics.count,
        open_issue_count: metrics.open_count,
        average_close_seconds: metrics.average_close_seconds,
    })
}
