//! Configuration for the GitHub API connection.
use secrecy::SecretString;

use crate::error::{ChangelogPrError, Result};

/// REST endpoint used when `GITHUB_API_URL` is not provided.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Page size for paginated list queries
pub const DEFAULT_PAGE_SIZE: u8 = 100;

/// Remote repository connection configuration for authenticating and
/// interacting with the GitHub API.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the REST API (e.g. "https://api.github.com").
    pub api_url: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token for authentication.
    pub token: SecretString,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            token: SecretString::from("".to_string()),
        }
    }
}

impl RemoteConfig {
    /// Build a remote config from an `owner/repo` slug as found in
    /// `GITHUB_REPOSITORY`.
    pub fn from_slug(
        api_url: &str,
        slug: &str,
        token: SecretString,
    ) -> Result<Self> {
        let (owner, repo) = slug
            .trim()
            .split_once('/')
            .filter(|(owner, repo)| {
                !owner.is_empty() && !repo.is_empty() && !repo.contains('/')
            })
            .ok_or_else(|| {
                ChangelogPrError::configuration(format!(
                    "repository must be in the form owner/repo, got: '{slug}'"
                ))
            })?;

        let api_url = if api_url.trim().is_empty() {
            DEFAULT_API_URL
        } else {
            api_url.trim().trim_end_matches('/')
        };

        Ok(Self {
            api_url: api_url.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token,
        })
    }

    /// Full repository path.
    pub fn path(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
