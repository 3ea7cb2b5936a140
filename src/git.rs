//! Remote branch lookups through the git executable.
use async_trait::async_trait;
use log::*;
use std::process::Stdio;
use tokio::process::Command;

#[cfg(test)]
use mockall::automock;

use crate::error::{ChangelogPrError, Result};

/// Remote the checked out repository pushes to inside a workflow.
pub const DEFAULT_REMOTE: &str = "origin";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Git: Send + Sync {
    /// Whether `branch` exists on the remote.
    async fn branch_exists(&self, branch: &str) -> Result<bool>;
}

/// Shells out to `git ls-remote` in the current working directory, which
/// reuses whatever credentials the checkout step configured.
pub struct GitCli {
    remote: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE)
    }
}

impl GitCli {
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
        }
    }
}

#[async_trait]
impl Git for GitCli {
    async fn branch_exists(&self, branch: &str) -> Result<bool> {
        debug!("running git ls-remote for {}:{branch}", self.remote);

        let status = Command::new("git")
            .args(["ls-remote", "--exit-code", "--heads"])
            .arg(&self.remote)
            .arg(branch)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|err| {
                ChangelogPrError::Git(format!("failed to run git: {err}"))
            })?;

        // exit code 2 means no matching refs, anything non-zero is a miss
        Ok(status.success())
    }
}
