//! Paginated retrieval of commits and issues from the GitHub REST API.
//!
//! The rest of the crate only sees the `ActivitySource` trait; `GitHubClient`
//! is its octocrab-backed implementation. Each fetch walks every page before
//! returning, so callers receive either the full window or an error.

use crate::config::RepoId;
use crate::error::{ActivityError, Result};
use crate::window::ReportWindow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::models::issues::Issue;
use octocrab::{params, Octocrab, Page};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PER_PAGE: u8 = 100;

/// A commit that landed inside the reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub sha: String,
    pub committed_at: Option<DateTime<Utc>>,
}

/// An issue or pull request. `closed_at` is `None` while it is still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    pub id: u64,
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub is_pull_request: bool,
}

/// Lifecycle filter applied when listing issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
    #[default]
    All,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueState {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            "all" => Ok(IssueState::All),
            _ => Err(ActivityError::InvalidSetting {
                name: "ISSUE_STATE",
                value: s.to_string(),
            }),
        }
    }
}

/// Source of raw repository activity.
///
/// Implementations perform all pagination internally and return fully
/// materialized results; the order of records is not significant.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Lists the commits made within `window`.
    async fn fetch_commits(
        &self,
        repo_id: &RepoId,
        window: &ReportWindow,
    ) -> Result<Vec<CommitRecord>>;

    /// Lists the issues and pull requests in `state` created within `window`.
    async fn fetch_issues(
        &self,
        repo_id: &RepoId,
        window: &ReportWindow,
        state: IssueState,
    ) -> Result<Vec<IssueRecord>>;
}

#[async_trait]
impl<'a, T: ActivitySource + ?Sized> ActivitySource for &'a T {
    async fn fetch_commits(
        &self,
        repo_id: &RepoId,
        window: &ReportWindow,
    ) -> Result<Vec<CommitRecord>> {
        (**self).fetch_commits(repo_id, window).await
    }

    async fn fetch_issues(
        &self,
        repo_id: &RepoId,
        window: &ReportWindow,
        state: IssueState,
    ) -> Result<Vec<IssueRecord>> {
        (**self).fetch_issues(repo_id, window, state).await
    }
}

pub struct GitHubClient {
    octocrab: Octocrab,
    max_pages: u32,
}

impl GitHubClient {
    pub fn new(token: Option<String>, max_pages: u32) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }

        Ok(Self {
            octocrab: builder.build()?,
            max_pages,
        })
    }

    /// Follows `next` links until the last page.
    ///
    /// Fails rather than returning a truncated listing when more than
    /// `max_pages` pages would be needed.
    async fn collect_pages<T>(&self, repo_id: &RepoId, mut current_page: Page<T>) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page_count = 1;

        loop {
            tracing::debug!(
                repo_id = %repo_id,
                page = page_count,
                items = current_page.items.len(),
                "Fetched page"
            );
            let next = current_page.next.take();
            items.append(&mut current_page.items);

            if next.is_none() {
                break;
            }

            if page_count >= self.max_pages {
                tracing::warn!(
                    "Hit max_github_api_pages ({}) for repo {} before the last page",
                    self.max_pages,
                    repo_id
                );
                return Err(ActivityError::FetchFailure(anyhow::anyhow!(
                    "reached MAX_GITHUB_API_PAGES ({}) for {} before the last page",
                    self.max_pages,
                    repo_id
                )));
            }

            match self.octocrab.get_page::<T>(&next).await? {
                Some(next_page) => {
                    current_page = next_page;
                    page_count += 1;
                }
                None => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl ActivitySource for GitHubClient {
    async fn fetch_commits(
        &self,
        repo_id: &RepoId,
        window: &ReportWindow,
    ) -> Result<Vec<CommitRecord>> {
        let (owner, repo) = sanitize(repo_id);

        let first = self
            .octocrab
            .repos(owner, repo)
            .list_commits()
            .since(window.start)
            .until(window.end)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let commits = self.collect_pages(repo_id, first).await?;

        Ok(commits
            .into_iter()
            .map(|c| CommitRecord {
                sha: c.sha,
                committed_at: c.commit.committer.and_then(|committer| committer.date),
            })
            .collect())
    }

    async fn fetch_issues(
        &self,
        repo_id: &RepoId,
        window: &ReportWindow,
        state: IssueState,
    ) -> Result<Vec<IssueRecord>> {
        let (owner, repo) = sanitize(repo_id);

        let first = self
            .octocrab
            .issues(owner, repo)
            .list()
            .state(state.into())
            .since(window.start)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let issues = self.collect_pages(repo_id, first).await?;

        Ok(retain_in_window(
            issues.into_iter().map(IssueRecord::from).collect(),
            window,
        ))
    }
}

impl From<IssueState> for params::State {
    fn from(state: IssueState) -> Self {
        match state {
            IssueState::Open => params::State::Open,
            IssueState::Closed => params::State::Closed,
            IssueState::All => params::State::All,
        }
    }
}

impl From<Issue> for IssueRecord {
    fn from(issue: Issue) -> Self {
        IssueRecord {
            id: issue.id.into_inner(),
            number: issue.number,
            created_at: issue.created_at,
            closed_at: issue.closed_at,
            is_pull_request: issue.pull_request.is_some(),
        }
    }
}

/// Keeps issues created inside `window`.
///
/// The issues endpoint filters `since` on update time and has no upper bound,
/// so the listing is wider than the window.
pub fn retain_in_window(mut issues: Vec<IssueRecord>, window: &ReportWindow) -> Vec<IssueRecord> {
    issues.retain(|issue| window.contains(issue.created_at));
    issues
}

// Sanitize inputs to prevent path traversal or unintended endpoint access
fn sanitize(repo_id: &RepoId) -> (String, String) {
    (
        repo_id.owner.trim().replace("..", ""),
        repo_id.repo.trim().replace("..", ""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::header;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use chrono::TimeZone;
    use serde_json::{json, Value};

    const MOCK_PAGES: u32 = 3;

    #[derive(Deserialize)]
    struct PageQuery {
        page: Option<u32>,
    }

    async fn list_items(State(base): State<String>, Query(query): Query<PageQuery>) -> Response {
        let page = query.page.unwrap_or(1);
        let body = Json(vec![json!({ "page": page, "n": 1 }), json!({ "page": page, "n": 2 })]);

        if page < MOCK_PAGES {
            let link = format!("<{}/items?page={}>; rel=\"next\"", base, page + 1);
            ([(header::LINK, link)], body).into_response()
        } else {
            body.into_response()
        }
    }

    /// Serves `MOCK_PAGES` linked pages of two items each and returns the base URL.
    async fn serve_pages() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let app = Router::new()
            .route("/items", get(list_items))
            .with_state(base.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        base
    }

    fn mock_client(base: &str, max_pages: u32) -> GitHubClient {
        GitHubClient {
            octocrab: Octocrab::builder()
                .base_uri(base)
                .unwrap()
                .build()
                .unwrap(),
            max_pages,
        }
    }

    fn repo_id() -> RepoId {
        RepoId {
            owner: "test_owner".to_string(),
            repo: "test_repo".to_string(),
        }
    }

    fn issue(id: u64, created_at: DateTime<Utc>) -> IssueRecord {
        IssueRecord {
            id,
            number: id,
            created_at,
            closed_at: None,
            is_pull_request: false,
        }
    }

    #[test]
    fn test_issue_state_from_str() {
        assert_eq!("open".parse::<IssueState>().unwrap(), IssueState::Open);
        assert_eq!("Closed".parse::<IssueState>().unwrap(), IssueState::Closed);
        assert_eq!(" ALL ".parse::<IssueState>().unwrap(), IssueState::All);
        assert!(matches!(
            "merged".parse::<IssueState>(),
            Err(ActivityError::InvalidSetting { name: "ISSUE_STATE", .. })
        ));
    }

    #[test]
    fn test_retain_in_window_drops_outside_issues() {
        let window = ReportWindow::from_dates(Some("2023-04-01"), Some("2023-04-30")).unwrap();
        let issues = vec![
            issue(1, Utc.with_ymd_and_hms(2023, 3, 31, 14, 59, 59).unwrap()),
            issue(2, Utc.with_ymd_and_hms(2023, 3, 31, 15, 0, 0).unwrap()),
            issue(3, Utc.with_ymd_and_hms(2023, 4, 30, 14, 59, 59).unwrap()),
            issue(4, Utc.with_ymd_and_hms(2023, 4, 30, 15, 0, 0).unwrap()),
        ];

        let kept: Vec<u64> = retain_in_window(issues, &window)
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(kept, vec![2, 3]);
    }

    #[test]
    fn test_sanitize_strips_traversal() {
        let repo_id = RepoId {
            owner: " ../owner ".to_string(),
            repo: "repo..".to_string(),
        };
        assert_eq!(sanitize(&repo_id), ("/owner".to_string(), "repo".to_string()));
    }

    #[tokio::test]
    async fn test_collect_pages_follows_next_links() {
        let base = serve_pages().await;
        let client = mock_client(&base, MOCK_PAGES);

        let first: Page<Value> = client.octocrab.get("/items", None::<&()>).await.unwrap();
        let items = client.collect_pages(&repo_id(), first).await.unwrap();

        assert_eq!(items.len(), 6);
        let pages: Vec<u64> = items.iter().map(|i| i["page"].as_u64().unwrap()).collect();
        assert_eq!(pages, vec![1, 1, 2, 2, 3, 3]);
    }

    #[tokio::test]
    async fn test_collect_pages_fails_at_page_cap() {
        let base = serve_pages().await;
        let client = mock_client(&base, 1);

        let first: Page<Value> = client.octocrab.get("/items", None::<&()>).await.unwrap();
        let err = client.collect_pages(&repo_id(), first).await.unwrap_err();

        assert!(matches!(err, ActivityError::FetchFailure(_)));
        assert!(err.to_string().contains("MAX_GITHUB_API_PAGES (1)"));
        assert!(err.to_string().contains("test_owner/test_repo"));
    }

    #[tokio::test]
    async fn test_collect_pages_stops_on_last_page_below_cap() {
        let base = serve_pages().await;
        let client = mock_client(&base, 10);

        let first: Page<Value> = client.octocrab.get("/items", None::<&()>).await.unwrap();
        let items = client.collect_pages(&repo_id(), first).await.unwrap();

        assert_eq!(items.len(), 6);
    }
}
