//! Creates the pull request from the source to the target branch, or
//! refreshes the body of the one already open.
use log::*;

use crate::{
    action,
    changelog::Composer,
    config::ActionConfig,
    error::{ChangelogPrError, Result},
    forge::{
        request::{
            CreatePrRequest, GetPrRequest, PullRequestRecord, UpdatePrRequest,
        },
        traits::Forge,
    },
    git::Git,
};

/// Run the whole action and return the created or updated pull request.
pub async fn execute(
    config: &ActionConfig,
    forge: &dyn Forge,
    git: &dyn Git,
) -> Result<PullRequestRecord> {
    let target_branch = match &config.target_branch {
        Some(branch) => branch.clone(),
        None => {
            let branch = forge.default_branch().await?;
            info!("no target branch configured: using default branch {branch}");
            branch
        }
    };

    action::start_group("Prerequisite Checks");
    let existing = prerequisites(config, forge, git, &target_branch).await;
    action::end_group();
    let existing = existing?;

    action::start_group("Pull Request Processing");
    let pull = process(config, forge, &target_branch, existing).await;
    action::end_group();

    pull
}

async fn prerequisites(
    config: &ActionConfig,
    forge: &dyn Forge,
    git: &dyn Git,
    target_branch: &str,
) -> Result<Option<PullRequestRecord>> {
    check_branches(git, &config.source_branch, target_branch).await?;

    info!("checking if there is an open PR for the source to target branch");
    let existing = forge
        .find_open_pull_request(GetPrRequest {
            head_branch: config.source_branch.clone(),
            base_branch: target_branch.to_string(),
        })
        .await?;

    match &existing {
        Some(pr) => info!("PR #{} exists", pr.number),
        None => {
            info!("PR does not exist yet");
            if config.title.is_none() {
                return Err(ChangelogPrError::configuration(
                    "input required and not supplied: title",
                ));
            }
        }
    }

    Ok(existing)
}

/// Checks both branches before failing so every missing one is reported.
async fn check_branches(
    git: &dyn Git,
    source_branch: &str,
    target_branch: &str,
) -> Result<()> {
    info!("checking if branches exist");

    let mut missing: Vec<String> = vec![];

    for (kind, branch) in [("source", source_branch), ("target", target_branch)]
    {
        if git.branch_exists(branch).await? {
            info!("{kind} branch: \"{branch}\" exists");
        } else {
            error!("{kind} branch '{branch}' does not exist!");
            missing.push(branch.to_string());
        }
    }

    if !missing.is_empty() {
        return Err(ChangelogPrError::BranchNotFound(missing));
    }

    Ok(())
}

async fn process(
    config: &ActionConfig,
    forge: &dyn Forge,
    target_branch: &str,
    existing: Option<PullRequestRecord>,
) -> Result<PullRequestRecord> {
    let previous_body = existing.as_ref().map(|pr| pr.body.as_str());

    let body = Composer::new(forge)
        .compose(
            &config.source_branch,
            target_branch,
            previous_body.unwrap_or_default(),
            &config.compose,
        )
        .await?;

    if let Some(pr) = existing {
        info!("updating pull request #{}", pr.number);
        let pull = forge
            .update_pull_request(UpdatePrRequest {
                pr_number: pr.number,
                body,
                reviewers: config.reviewers.clone(),
            })
            .await?;
        info!("pull request updated: {} (#{})", pull.url, pull.number);
        return Ok(pull);
    }

    let title = config.title.clone().ok_or_else(|| {
        ChangelogPrError::configuration("input required and not supplied: title")
    })?;

    info!("creating new pull request");
    let pull = forge
        .create_pull_request(CreatePrRequest {
            head_branch: config.source_branch.clone(),
            base_branch: target_branch.to_string(),
            draft: config.draft,
            title,
            body,
            labels: config.labels.clone(),
            reviewers: config.reviewers.clone(),
            assignees: config.assignees.clone(),
        })
        .await?;
    info!("pull request created: {} (#{})", pull.url, pull.number);

    Ok(pull)
}
