//! Changelog composition: issue extraction, grouping and Markdown rendering
//! of the pull requests merged between two branches.

/// Recovery of checked list items from a previous pull request body.
pub mod checklist;

/// Conventional commit type prefixes and their changelog headings.
pub mod commit_type;

/// Orchestrates fetching, grouping and rendering of the changelog.
pub mod composer;

/// Issue reference extraction from pull request descriptions.
pub mod issues;

pub use composer::{ComposeOptions, ComposeOptionsBuilder, Composer};
