use std::collections::BTreeMap;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::changelog::issues::{IssueGroups, NO_ISSUE};

/// Changelog sections keyed by conventional commit type. Declaration order
/// is the rendering order, `Others` last.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
)]
pub enum CommitType {
    #[strum(to_string = "Features")]
    Feat,
    #[strum(to_string = "Bug Fixes")]
    Fix,
    #[strum(to_string = "Documentation")]
    Docs,
    #[strum(to_string = "Styles")]
    Style,
    #[strum(to_string = "Code Refactoring")]
    Refactor,
    #[strum(to_string = "Performance Improvements")]
    Perf,
    #[strum(to_string = "Tests")]
    Test,
    #[strum(to_string = "Builds")]
    Build,
    #[strum(to_string = "Continuous Integrations")]
    Ci,
    #[strum(to_string = "Chores")]
    Chore,
    #[strum(to_string = "Reverts")]
    Revert,
    #[strum(to_string = "Merges")]
    Merge,
    #[strum(to_string = "Releases")]
    Release,
    #[strum(to_string = "Syncs")]
    Sync,
    #[strum(to_string = "Others")]
    Others,
}

impl CommitType {
    /// Title prefix that selects this type, `None` for the fallback.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            CommitType::Feat => Some("feat"),
            CommitType::Fix => Some("fix"),
            CommitType::Docs => Some("docs"),
            CommitType::Style => Some("style"),
            CommitType::Refactor => Some("refactor"),
            CommitType::Perf => Some("perf"),
            CommitType::Test => Some("test"),
            CommitType::Build => Some("build"),
            CommitType::Ci => Some("ci"),
            CommitType::Chore => Some("chore"),
            CommitType::Revert => Some("revert"),
            CommitType::Merge => Some("merge"),
            CommitType::Release => Some("release"),
            CommitType::Sync => Some("sync"),
            CommitType::Others => None,
        }
    }

    /// First type whose prefix starts the title, ignoring case.
    pub fn match_title(title: &str) -> Option<CommitType> {
        let title = title.to_lowercase();
        CommitType::iter().find(|commit_type| {
            commit_type
                .prefix()
                .is_some_and(|prefix| title.starts_with(prefix))
        })
    }

    /// Like [`CommitType::match_title`] but falls back to `Others`.
    pub fn classify(title: &str) -> CommitType {
        Self::match_title(title).unwrap_or(CommitType::Others)
    }
}

pub type TypeBuckets = BTreeMap<CommitType, IssueGroups>;

/// Re-buckets issue groups by commit type.
///
/// Pull requests without an issue are classified one by one. An issue group
/// is kept together and lands in the bucket of the first pull request whose
/// title carries a known prefix, or `Others` when none does. The `Others`
/// bucket always exists, possibly empty.
pub fn group_by_commit_type(issue_groups: &IssueGroups) -> TypeBuckets {
    let mut buckets = TypeBuckets::new();
    buckets.insert(CommitType::Others, IssueGroups::new());

    for (issue, prs) in issue_groups {
        if issue == NO_ISSUE {
            for entry in prs {
                let commit_type = CommitType::classify(&entry.pr.title);
                buckets
                    .entry(commit_type)
                    .or_default()
                    .entry(NO_ISSUE.to_string())
                    .or_default()
                    .push(entry.clone());
            }
            continue;
        }

        let commit_type = prs
            .iter()
            .find_map(|entry| CommitType::match_title(&entry.pr.title))
            .unwrap_or(CommitType::Others);

        buckets
            .entry(commit_type)
            .or_default()
            .entry(issue.clone())
            .or_default()
            .extend(prs.iter().cloned());
    }

    buckets
}
