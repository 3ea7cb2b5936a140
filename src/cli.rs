//! CLI argument parsing. Every option can also be supplied through the
//! environment variable GitHub Actions sets for the matching action input.
use clap::Parser;

use crate::{changelog::composer::DEFAULT_RESOLVE_KEYWORD, forge::config::DEFAULT_API_URL};

/// Action inputs. Values are kept as raw strings, exactly as the runner
/// passes them, and validated by [`crate::config::ActionConfig`].
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, env = "INPUT_TOKEN", default_value = "", hide_env_values = true)]
    /// Token used to authenticate with the GitHub API. Required.
    pub token: String,

    #[arg(long, env = "INPUT_SOURCE-BRANCH", default_value = "")]
    /// Branch the pull request merges from. Required.
    pub source_branch: String,

    #[arg(long, env = "INPUT_TARGET-BRANCH", default_value = "")]
    /// Branch the pull request merges into. Defaults to the repository's
    /// default branch.
    pub target_branch: String,

    #[arg(long, env = "INPUT_DRAFT", default_value = "false")]
    /// Create the pull request as a draft.
    pub draft: String,

    #[arg(long, env = "INPUT_TITLE", default_value = "")]
    /// Title of the pull request. Required when a pull request is created.
    pub title: String,

    #[arg(long, env = "INPUT_BODY", default_value = "")]
    /// Text placed above the generated changelog.
    pub body: String,

    #[arg(long, env = "INPUT_RESOLVE-LINE-KEYWORD", default_value = DEFAULT_RESOLVE_KEYWORD)]
    /// Keyword identifying the line of a PR description that lists the
    /// issues it resolves.
    pub resolve_line_keyword: String,

    #[arg(long, env = "INPUT_LIST-TITLE", default_value = "")]
    /// Heading rendered above the changelog list.
    pub list_title: String,

    #[arg(long, env = "INPUT_LABELS", default_value = "")]
    /// Comma separated labels added to a newly created pull request.
    pub labels: String,

    #[arg(long, env = "INPUT_ASSIGNEES", default_value = "")]
    /// Comma separated assignees added to a newly created pull request.
    pub assignees: String,

    #[arg(long, env = "INPUT_REVIEWERS", default_value = "")]
    /// Comma separated reviewers requested on the pull request.
    pub reviewers: String,

    #[arg(long, env = "INPUT_COMMIT-TYPE-GROUPING", default_value = "false")]
    /// Group the changelog under conventional commit type headings.
    pub commit_type_grouping: String,

    #[arg(long, env = "INPUT_EXCLUDE-KEYWORDS", default_value = "")]
    /// Comma separated keywords; PRs whose title contains one are skipped.
    pub exclude_keywords: String,

    #[arg(long, env = "INPUT_WITH-AUTHOR", default_value = "false")]
    /// Append the author's login to every pull request line.
    pub with_author: String,

    #[arg(long, env = "INPUT_WITH-CHECKBOX", default_value = "false")]
    /// Render every line as a checklist item, keeping previous marks.
    pub with_checkbox: String,

    #[arg(long, env = "GITHUB_REPOSITORY", default_value = "")]
    /// Repository in owner/repo form.
    pub repository: String,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    /// Base URL of the GitHub REST API.
    pub api_url: String,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}
