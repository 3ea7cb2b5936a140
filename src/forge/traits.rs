//! Traits related to the remote git forge
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    error::Result,
    forge::request::{
        CreatePrRequest, GetPrRequest, PullRequestRecord, UpdatePrRequest,
    },
};

/// Narrow view of the repository host consumed by the changelog composer
/// and the pull request command.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// Name of the repository's default branch.
    async fn default_branch(&self) -> Result<String>;

    /// Ordered SHAs of the commits reachable from `source` but not from
    /// `target`. Fails with `BranchNotFound` when either side is unknown.
    async fn list_commit_shas(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Vec<String>>;

    /// Pull requests associated with a commit, in host order.
    async fn list_pull_requests_for_commit(
        &self,
        sha: &str,
    ) -> Result<Vec<PullRequestRecord>>;

    async fn find_open_pull_request(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequestRecord>>;

    /// Create the pull request, then attach labels, reviewers and assignees.
    async fn create_pull_request(
        &self,
        req: CreatePrRequest,
    ) -> Result<PullRequestRecord>;

    /// Replace the body of a pull request and request any reviewers.
    async fn update_pull_request(
        &self,
        req: UpdatePrRequest,
    ) -> Result<PullRequestRecord>;
}
