use derive_builder::Builder;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Open/closed state of a pull request as reported by the host.
pub enum PrState {
    Open,
    #[default]
    Closed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(setter(into), default)]
/// Pull request as fetched from the forge. Immutable for the rest of a run.
pub struct PullRequestRecord {
    /// Host-assigned unique identifier, used for deduplication
    pub id: u64,
    /// User facing number (the `#n` of the pull request)
    pub number: u64,
    pub title: String,
    /// Description text, empty when the host returns none
    pub body: String,
    /// Login of the author, if the host knows it
    #[builder(setter(into, strip_option))]
    pub author: Option<String>,
    /// Canonical html URL of the pull request
    pub url: String,
    pub state: PrState,
}

impl PullRequestRecord {
    pub fn is_open(&self) -> bool {
        self.state == PrState::Open
    }
}

#[derive(Debug, Clone)]
/// Request to get the open pull request between two branches.
pub struct GetPrRequest {
    pub head_branch: String,
    pub base_branch: String,
}

#[derive(Debug, Clone, Default)]
/// Request to create a new pull request.
pub struct CreatePrRequest {
    pub head_branch: String,
    pub base_branch: String,
    pub draft: bool,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub reviewers: Vec<String>,
    pub assignees: Vec<String>,
}

#[derive(Debug, Clone, Default)]
/// Request to update the body of an existing pull request.
pub struct UpdatePrRequest {
    pub pr_number: u64,
    pub body: String,
    pub reviewers: Vec<String>,
}
