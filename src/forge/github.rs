//! Implements the Forge trait for Github
use async_trait::async_trait;
use log::*;
use octocrab::{Octocrab, models::IssueState, params};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ChangelogPrError, Result},
    forge::{
        config::{DEFAULT_PAGE_SIZE, RemoteConfig},
        request::{
            CreatePrRequest, GetPrRequest, PrState, PullRequestRecord,
            UpdatePrRequest,
        },
        traits::Forge,
    },
};

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct ComparisonCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct Comparison {
    total_commits: usize,
    commits: Vec<ComparisonCommit>,
}

#[derive(Debug, Deserialize)]
struct AssociatedUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct AssociatedPullRequest {
    id: u64,
    number: u64,
    title: String,
    body: Option<String>,
    html_url: String,
    state: PrState,
    user: Option<AssociatedUser>,
}

impl From<AssociatedPullRequest> for PullRequestRecord {
    fn from(pr: AssociatedPullRequest) -> Self {
        Self {
            id: pr.id,
            number: pr.number,
            title: pr.title,
            body: pr.body.unwrap_or_default(),
            author: pr.user.map(|u| u.login),
            url: pr.html_url,
            state: pr.state,
        }
    }
}

impl From<octocrab::models::pulls::PullRequest> for PullRequestRecord {
    fn from(pr: octocrab::models::pulls::PullRequest) -> Self {
        let state = if matches!(pr.state, Some(IssueState::Open)) {
            PrState::Open
        } else {
            PrState::Closed
        };

        Self {
            id: pr.id.into_inner(),
            number: pr.number,
            title: pr.title.unwrap_or_default(),
            body: pr.body.unwrap_or_default(),
            author: pr.user.map(|u| u.login),
            url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
            state,
        }
    }
}

/// GitHub forge implementation using Octocrab for the compare, commit
/// association and pull request endpoints.
pub struct Github {
    config: RemoteConfig,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(config.api_url.clone())?
            .build()?;

        Ok(Self { config, instance })
    }

    fn endpoint(&self, route: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.config.api_url, self.config.owner, self.config.repo, route
        )
    }

    async fn request_reviewers(
        &self,
        pr_number: u64,
        reviewers: &[String],
    ) -> Result<()> {
        if reviewers.is_empty() {
            return Ok(());
        }

        debug!(
            "requesting {} reviewers for PR #{pr_number}: {}",
            reviewers.len(),
            reviewers.join(",")
        );

        let endpoint =
            self.endpoint(&format!("pulls/{pr_number}/requested_reviewers"));
        let body = serde_json::json!({ "reviewers": reviewers });
        let _: serde_json::Value =
            self.instance.post(endpoint, Some(&body)).await?;

        Ok(())
    }

    async fn add_labels(&self, pr_number: u64, labels: &[String]) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }

        debug!(
            "adding {} labels to PR #{pr_number}: {}",
            labels.len(),
            labels.join(",")
        );

        self.instance
            .issues(&self.config.owner, &self.config.repo)
            .add_labels(pr_number, labels)
            .await?;

        Ok(())
    }

    async fn add_assignees(
        &self,
        pr_number: u64,
        assignees: &[String],
    ) -> Result<()> {
        if assignees.is_empty() {
            return Ok(());
        }

        debug!(
            "adding {} assignees to PR #{pr_number}: {}",
            assignees.len(),
            assignees.join(",")
        );

        let endpoint = self.endpoint(&format!("issues/{pr_number}/assignees"));
        let body = serde_json::json!({ "assignees": assignees });
        let _: serde_json::Value =
            self.instance.post(endpoint, Some(&body)).await?;

        Ok(())
    }
}

/// Another compare page is needed while pages come back full and fewer
/// than `total` commits have been collected.
fn has_more_pages(received: usize, collected: usize, total: usize) -> bool {
    received >= usize::from(DEFAULT_PAGE_SIZE) && collected < total
}

/// The compare endpoint answers 404 when either ref is unknown.
fn compare_not_found(
    status: StatusCode,
    source: &str,
    target: &str,
) -> Option<ChangelogPrError> {
    (status == StatusCode::NOT_FOUND).then(|| {
        ChangelogPrError::BranchNotFound(vec![
            source.to_string(),
            target.to_string(),
        ])
    })
}

fn compare_error(
    err: octocrab::Error,
    source: &str,
    target: &str,
) -> ChangelogPrError {
    if let octocrab::Error::GitHub { source: github, .. } = &err {
        if let Some(missing) =
            compare_not_found(github.status_code, source, target)
        {
            error!("unable to compare {target}...{source}: {github}");
            return missing;
        }
    }

    err.into()
}

#[async_trait]
impl Forge for Github {
    async fn default_branch(&self) -> Result<String> {
        let repo = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .get()
            .await?;

        repo.default_branch.ok_or_else(|| {
            ChangelogPrError::upstream(format!(
                "failed to find default branch for repo: {}",
                self.config.path()
            ))
        })
    }

    async fn list_commit_shas(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Vec<String>> {
        debug!("fetching all associated commits of {source} and {target}");

        let endpoint = self.endpoint(&format!("compare/{target}...{source}"));
        let mut shas: Vec<String> = vec![];
        let mut page = 1;

        loop {
            let params = PageParams {
                per_page: DEFAULT_PAGE_SIZE,
                page,
            };

            let result: std::result::Result<Comparison, octocrab::Error> =
                self.instance.get(&endpoint, Some(&params)).await;

            let comparison = match result {
                Ok(comparison) => comparison,
                Err(err) => return Err(compare_error(err, source, target)),
            };

            let received = comparison.commits.len();
            shas.extend(comparison.commits.into_iter().map(|c| c.sha));

            if !has_more_pages(received, shas.len(), comparison.total_commits) {
                break;
            }

            page += 1;
        }

        debug!("found {} commits", shas.len());

        Ok(shas)
    }

    async fn list_pull_requests_for_commit(
        &self,
        sha: &str,
    ) -> Result<Vec<PullRequestRecord>> {
        let endpoint = self.endpoint(&format!("commits/{sha}/pulls"));
        let params = PageParams {
            per_page: DEFAULT_PAGE_SIZE,
            page: 1,
        };

        let prs: Vec<AssociatedPullRequest> =
            self.instance.get(endpoint, Some(&params)).await?;

        debug!("commit {sha} is associated with {} pull requests", prs.len());

        Ok(prs.into_iter().map(PullRequestRecord::from).collect())
    }

    async fn find_open_pull_request(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequestRecord>> {
        debug!(
            "looking up pull request with source branch: \"{}\" and target branch: \"{}\"",
            req.head_branch, req.base_branch
        );

        let page = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(params::State::Open)
            .head(format!("{}:{}", self.config.owner, req.head_branch))
            .base(req.base_branch)
            .send()
            .await?;

        debug!("found {} matches", page.items.len());

        Ok(page.items.into_iter().last().map(PullRequestRecord::from))
    }

    async fn create_pull_request(
        &self,
        req: CreatePrRequest,
    ) -> Result<PullRequestRecord> {
        debug!("creating PR \"{}\"", req.title);

        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .create(req.title, req.head_branch, req.base_branch)
            .body(req.body)
            .draft(Some(req.draft))
            .send()
            .await?;

        self.add_labels(pr.number, &req.labels).await?;
        self.request_reviewers(pr.number, &req.reviewers).await?;
        self.add_assignees(pr.number, &req.assignees).await?;

        Ok(PullRequestRecord::from(pr))
    }

    async fn update_pull_request(
        &self,
        req: UpdatePrRequest,
    ) -> Result<PullRequestRecord> {
        debug!("updating PR #{}", req.pr_number);

        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .update(req.pr_number)
            .body(req.body)
            .send()
            .await?;

        self.request_reviewers(req.pr_number, &req.reviewers).await?;

        Ok(PullRequestRecord::from(pr))
    }
}
