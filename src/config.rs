//! Validated run configuration built from the raw action inputs.
use derive_builder::Builder;
use secrecy::SecretString;

use crate::{
    changelog::composer::{ComposeOptions, DEFAULT_RESOLVE_KEYWORD},
    cli::Args,
    error::{ChangelogPrError, Result},
    forge::config::RemoteConfig,
};

/// Everything a run needs, checked before the first API call.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct ActionConfig {
    pub remote: RemoteConfig,
    pub source_branch: String,
    /// `None` means the repository's default branch
    #[builder(default)]
    pub target_branch: Option<String>,
    #[builder(default)]
    pub draft: bool,
    /// Only required when a pull request has to be created
    #[builder(default)]
    pub title: Option<String>,
    #[builder(default)]
    pub labels: Vec<String>,
    #[builder(default)]
    pub assignees: Vec<String>,
    #[builder(default)]
    pub reviewers: Vec<String>,
    #[builder(default)]
    pub compose: ComposeOptions,
    #[builder(default)]
    pub debug: bool,
}

impl ActionConfigBuilder {
    pub fn build(&self) -> Result<ActionConfig> {
        self._build().map_err(|e| {
            ChangelogPrError::configuration(format!(
                "failed to build action config: {e}"
            ))
        })
    }
}

impl ActionConfig {
    pub fn builder() -> ActionConfigBuilder {
        ActionConfigBuilder::default()
    }
}

impl TryFrom<&Args> for ActionConfig {
    type Error = ChangelogPrError;

    fn try_from(args: &Args) -> Result<Self> {
        let token = required("token", &args.token)?;
        let source_branch = required("source-branch", &args.source_branch)?;

        let remote = RemoteConfig::from_slug(
            &args.api_url,
            &args.repository,
            SecretString::from(token),
        )?;

        let compose = ComposeOptions {
            body_prefix: args.body.clone(),
            resolve_keyword: optional(&args.resolve_line_keyword)
                .unwrap_or_else(|| DEFAULT_RESOLVE_KEYWORD.to_string()),
            list_title: args.list_title.trim().to_string(),
            exclude_keywords: parse_list(&args.exclude_keywords),
            group_by_type: parse_bool(
                "commit-type-grouping",
                &args.commit_type_grouping,
            )?,
            with_author: parse_bool("with-author", &args.with_author)?,
            with_checkbox: parse_bool("with-checkbox", &args.with_checkbox)?,
        };

        ActionConfig::builder()
            .remote(remote)
            .source_branch(source_branch)
            .target_branch(optional(&args.target_branch))
            .draft(parse_bool("draft", &args.draft)?)
            .title(optional(&args.title))
            .labels(parse_list(&args.labels))
            .assignees(parse_list(&args.assignees))
            .reviewers(parse_list(&args.reviewers))
            .compose(compose)
            .debug(args.debug)
            .build()
    }
}

fn required(name: &str, value: &str) -> Result<String> {
    optional(value).ok_or_else(|| {
        ChangelogPrError::configuration(format!(
            "input required and not supplied: {name}"
        ))
    })
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Splits a comma separated input, trimming entries and dropping empty ones.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Parses a boolean input the way the Actions toolkit does. An unset input
/// is `false`.
pub fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "" | "false" | "False" | "FALSE" => Ok(false),
        "true" | "True" | "TRUE" => Ok(true),
        other => Err(ChangelogPrError::configuration(format!(
            "input does not meet YAML 1.2 \"Core Schema\" specification: {name}, got: '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use secrecy::ExposeSecret;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec![
            "changelog-pr",
            "--repository",
            "acme/widgets",
            "--api-url",
            "https://api.github.com",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn parse_list_trims_and_drops_empty_entries() {
        assert_eq!(
            parse_list(" bug, ,enhancement ,, docs"),
            vec!["bug", "enhancement", "docs"]
        );
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn parse_bool_accepts_core_schema_values() {
        for value in ["true", "True", "TRUE"] {
            assert!(parse_bool("draft", value).unwrap());
        }
        for value in ["false", "False", "FALSE", "", "  "] {
            assert!(!parse_bool("draft", value).unwrap());
        }
        assert!(matches!(
            parse_bool("draft", "yes"),
            Err(ChangelogPrError::Configuration(_))
        ));
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        let result = ActionConfig::try_from(&args(&["--source-branch", "dev"]));
        match result {
            Err(ChangelogPrError::Configuration(msg)) => {
                assert!(msg.contains("token"))
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn missing_source_branch_is_a_configuration_error() {
        let result = ActionConfig::try_from(&args(&["--token", "t"]));
        assert!(matches!(result, Err(ChangelogPrError::Configuration(_))));
    }

    #[test]
    fn builds_full_config() {
        let config = ActionConfig::try_from(&args(&[
            "--token",
            "s3cr3t",
            "--source-branch",
            "develop",
            "--target-branch",
            " ",
            "--draft",
            "true",
            "--title",
            "Release",
            "--body",
            "Intro",
            "--resolve-line-keyword",
            "",
            "--list-title",
            " Changelog ",
            "--labels",
            "release, automated",
            "--reviewers",
            "alice,,bob",
            "--exclude-keywords",
            "bump",
            "--commit-type-grouping",
            "true",
            "--with-checkbox",
            "TRUE",
        ]))
        .unwrap();

        assert_eq!(config.remote.token.expose_secret(), "s3cr3t");
        assert_eq!(config.remote.path(), "acme/widgets");
        assert_eq!(config.source_branch, "develop");
        assert!(config.target_branch.is_none());
        assert!(config.draft);
        assert_eq!(config.title.as_deref(), Some("Release"));
        assert_eq!(config.labels, vec!["release", "automated"]);
        assert_eq!(config.reviewers, vec!["alice", "bob"]);
        assert!(config.assignees.is_empty());
        assert_eq!(config.compose.body_prefix, "Intro");
        assert_eq!(config.compose.resolve_keyword, DEFAULT_RESOLVE_KEYWORD);
        assert_eq!(config.compose.list_title, "Changelog");
        assert_eq!(config.compose.exclude_keywords, vec!["bump"]);
        assert!(config.compose.group_by_type);
        assert!(config.compose.with_checkbox);
        assert!(!config.compose.with_author);
    }

    #[test]
    fn debug_output_never_contains_token() {
        let config = ActionConfig::try_from(&args(&[
            "--token",
            "ghp_supersecret",
            "--source-branch",
            "develop",
        ]))
        .unwrap();

        assert!(!format!("{config:?}").contains("ghp_supersecret"));
    }
}
