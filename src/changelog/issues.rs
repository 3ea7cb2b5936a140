//! Extracts the issues a pull request resolves from its description.
use indexmap::IndexMap;
use regex::Regex;
use std::{fmt, sync::LazyLock};

use crate::forge::request::PullRequestRecord;

/// Group key used for pull requests that reference no issue.
pub const NO_ISSUE: &str = "no-issue";

// `Fixes:#123`, `owner/repo#123`: anything up to the `#` is dropped. The
// prefix stops at a `#` so `#5,#6` yields both numbers.
static HASHTAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\[{()}\]\s#]*#(?<number>\d+)").unwrap());

// Commas end a link so comma separated links are matched one by one
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:[A-Za-z]{3,9}://|www\.)[^\s<>()\[\]{}"',]+"#).unwrap()
});

static ISSUE_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"issues/(?<number>\d+)").unwrap());

/// Canonical `#<number>` reference to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueToken(String);

impl IssueToken {
    pub fn from_number(number: &str) -> Self {
        Self(format!("#{number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pull requests keyed by issue token, iterated in first insertion order.
pub type IssueGroups = IndexMap<String, Vec<PrWithIssues>>;

/// A pull request together with the issues its description resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrWithIssues {
    pub pr: PullRequestRecord,
    /// Ordered by first occurrence, no duplicates
    pub issues: Vec<IssueToken>,
}

impl PrWithIssues {
    pub fn new(pr: PullRequestRecord, resolve_keyword: &str) -> Self {
        let issues = extract_issues(&pr.body, resolve_keyword);
        Self { pr, issues }
    }
}

/// First line of `description` containing `keyword`, ignoring case.
pub fn find_resolve_line<'a>(
    description: &'a str,
    keyword: &str,
) -> Option<&'a str> {
    let keyword = keyword.to_lowercase();
    description
        .lines()
        .find(|line| line.to_lowercase().contains(&keyword))
}

/// Issue tokens referenced on the resolve line of `description`, either
/// as hashtags or as links to an `issues/<n>` page.
pub fn extract_issues(description: &str, keyword: &str) -> Vec<IssueToken> {
    let Some(line) = find_resolve_line(description, keyword) else {
        return vec![];
    };

    let from_hashtags = HASHTAG_REGEX
        .captures_iter(line)
        .map(|caps| IssueToken::from_number(&caps["number"]));

    let from_links = URL_REGEX
        .find_iter(line)
        .map(|m| m.as_str())
        .filter(|url| url.contains("issues/"))
        .filter_map(issue_from_link);

    let mut issues: Vec<IssueToken> = vec![];
    for issue in from_hashtags.chain(from_links) {
        if !issues.contains(&issue) {
            issues.push(issue);
        }
    }

    issues
}

/// Rewrites `https://host/owner/repo/issues/42` to `#42`. Links without a
/// numeric issue segment yield nothing.
pub fn issue_from_link(link: &str) -> Option<IssueToken> {
    ISSUE_PATH_REGEX
        .captures(link)
        .map(|caps| IssueToken::from_number(&caps["number"]))
}

/// Whether a pull request is left out of the changelog entirely: it is
/// still open, or its title contains one of `exclude_keywords`.
pub fn is_excluded(pr: &PullRequestRecord, exclude_keywords: &[String]) -> bool {
    if pr.is_open() {
        return true;
    }

    let title = pr.title.to_lowercase();
    exclude_keywords
        .iter()
        .filter(|keyword| !keyword.is_empty())
        .any(|keyword| title.contains(&keyword.to_lowercase()))
}
