//! Turns the commits between two branches into a Markdown changelog.
use derive_builder::Builder;
use log::*;
use std::collections::HashMap;

use crate::{
    changelog::{
        checklist::ChecklistState,
        commit_type::group_by_commit_type,
        issues::{IssueGroups, NO_ISSUE, PrWithIssues, is_excluded},
    },
    error::Result,
    forge::{request::PullRequestRecord, traits::Forge},
};

/// Keyword looked for when no resolve line keyword is configured.
pub const DEFAULT_RESOLVE_KEYWORD: &str = "resolves";

/// Everything that shapes the rendered changelog apart from the branches
/// and the previous body.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default)]
pub struct ComposeOptions {
    /// Text placed before the changelog
    pub body_prefix: String,
    /// Keyword identifying the line that lists resolved issues
    pub resolve_keyword: String,
    /// Rendered as a `###` heading above the list when non-empty
    pub list_title: String,
    /// PRs whose title contains one of these (ignoring case) are skipped
    pub exclude_keywords: Vec<String>,
    pub group_by_type: bool,
    pub with_author: bool,
    pub with_checkbox: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            body_prefix: "".into(),
            resolve_keyword: DEFAULT_RESOLVE_KEYWORD.into(),
            list_title: "".into(),
            exclude_keywords: vec![],
            group_by_type: false,
            with_author: false,
            with_checkbox: false,
        }
    }
}

/// Builds the changelog body from the forge's commit to pull request
/// associations.
pub struct Composer<'a> {
    forge: &'a dyn Forge,
}

impl<'a> Composer<'a> {
    pub fn new(forge: &'a dyn Forge) -> Self {
        Self { forge }
    }

    /// Compose the new pull request body. Checkbox marks found in
    /// `previous_body` are carried over. Any forge failure aborts the whole
    /// composition.
    pub async fn compose(
        &self,
        source_branch: &str,
        target_branch: &str,
        previous_body: &str,
        options: &ComposeOptions,
    ) -> Result<String> {
        info!(
            "retrieving PR links for all diffs between head {source_branch} and base {target_branch}"
        );

        let shas = self
            .forge
            .list_commit_shas(source_branch, target_branch)
            .await?;

        let prs = self.fetch_prs_with_issues(&shas, options).await?;

        info!("grouping by related issues");
        let issue_groups = group_by_issue(prs);

        let checklist = ChecklistState::from_body(previous_body);
        debug!("found {} checked items in previous body", checklist.len());

        Ok(render(&issue_groups, &checklist, options))
    }

    /// Walks the commits in order and collects the eligible pull requests
    /// associated with each, one request per commit.
    async fn fetch_prs_with_issues(
        &self,
        shas: &[String],
        options: &ComposeOptions,
    ) -> Result<Vec<PrWithIssues>> {
        debug!(
            "fetching associated pull requests of commit shas: {}",
            shas.join(",")
        );

        let mut prs: Vec<PrWithIssues> = vec![];

        for sha in shas {
            let associated =
                self.forge.list_pull_requests_for_commit(sha).await?;

            for pr in associated {
                if is_excluded(&pr, &options.exclude_keywords) {
                    debug!("skipping PR #{}: {}", pr.number, pr.title);
                    continue;
                }

                prs.push(PrWithIssues::new(pr, &options.resolve_keyword));
            }
        }

        Ok(prs)
    }
}

/// Inverse index from issue token to the pull requests resolving it, in
/// the order the pull requests were encountered. PRs without issues are
/// collected under [`NO_ISSUE`], which always comes last. Every group is
/// deduplicated by pull request id.
pub fn group_by_issue(prs: Vec<PrWithIssues>) -> IssueGroups {
    let mut groups = IssueGroups::new();
    let mut without_issue: Vec<PrWithIssues> = vec![];

    for entry in prs {
        if entry.issues.is_empty() {
            without_issue.push(entry);
            continue;
        }

        for issue in entry.issues.iter() {
            groups
                .entry(issue.to_string())
                .or_default()
                .push(entry.clone());
        }
    }

    if !without_issue.is_empty() {
        groups.insert(NO_ISSUE.to_string(), without_issue);
    }

    groups
        .into_iter()
        .map(|(issue, prs)| (issue, dedup_by_id(prs)))
        .collect()
}

/// Collapses repeated pull requests keeping the first position and the
/// last seen record.
fn dedup_by_id(prs: Vec<PrWithIssues>) -> Vec<PrWithIssues> {
    let mut positions: HashMap<u64, usize> = HashMap::new();
    let mut unique: Vec<PrWithIssues> = Vec::with_capacity(prs.len());

    for entry in prs {
        match positions.get(&entry.pr.id) {
            Some(position) => unique[*position] = entry,
            None => {
                positions.insert(entry.pr.id, unique.len());
                unique.push(entry);
            }
        }
    }

    unique
}

/// Render the final body for already grouped pull requests.
pub fn render(
    issue_groups: &IssueGroups,
    checklist: &ChecklistState,
    options: &ComposeOptions,
) -> String {
    let mut renderer = Renderer {
        options,
        checklist,
        body: options.body_prefix.clone(),
    };

    if !options.list_title.trim().is_empty() {
        renderer.push_line(&format!("### {}", options.list_title.trim()));
    }

    if !options.group_by_type {
        info!("processing body changelog without commit type grouping");
        renderer.push_groups(issue_groups);
        return renderer.body;
    }

    info!("processing body changelog with commit type grouping");
    let buckets = group_by_commit_type(issue_groups);

    for (commit_type, groups) in &buckets {
        if groups.is_empty() {
            continue;
        }

        renderer.push_line(&format!("## {commit_type}"));
        renderer.push_groups(groups);
    }

    renderer.body
}

struct Renderer<'a> {
    options: &'a ComposeOptions,
    checklist: &'a ChecklistState,
    body: String,
}

impl Renderer<'_> {
    fn push_line(&mut self, line: &str) {
        if !self.body.is_empty() {
            self.body.push('\n');
        }
        self.body.push_str(line);
    }

    fn checkbox(&self, text: &str) -> &'static str {
        match (self.options.with_checkbox, self.checklist.is_checked(text)) {
            (false, _) => "",
            (true, true) => "[x] ",
            (true, false) => "[ ] ",
        }
    }

    fn pr_line(&self, indent: &str, pr: &PullRequestRecord) -> String {
        let author = match (&pr.author, self.options.with_author) {
            (Some(author), true) if !author.is_empty() => {
                format!(" - {author}")
            }
            _ => "".into(),
        };

        format!("{indent}- {}{}{author}", self.checkbox(&pr.url), pr.url)
    }

    fn push_groups(&mut self, groups: &IssueGroups) {
        for (issue, prs) in groups {
            if issue == NO_ISSUE {
                for entry in prs {
                    let line = self.pr_line("", &entry.pr);
                    self.push_line(&line);
                }
                continue;
            }

            let line = format!("- {}{issue}", self.checkbox(issue));
            self.push_line(&line);

            for entry in prs {
                let line = self.pr_line("  ", &entry.pr);
                self.push_line(&line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ChangelogPrError,
        forge::{request::PrState, request::PullRequestRecordBuilder, traits::MockForge},
    };
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn url(id: u64) -> String {
        format!("https://github.com/acme/widgets/pull/{id}")
    }

    fn pr(id: u64, title: &str, body: &str, author: &str) -> PullRequestRecord {
        let mut builder = PullRequestRecordBuilder::default();
        builder
            .id(id)
            .number(id)
            .title(title)
            .body(body)
            .url(url(id));
        if !author.is_empty() {
            builder.author(author);
        }
        builder.build().unwrap()
    }

    /// Mock forge answering with `commits`, each a sha and its PRs.
    fn forge_with(commits: Vec<(&'static str, Vec<PullRequestRecord>)>) -> MockForge {
        let shas: Vec<String> =
            commits.iter().map(|(sha, _)| sha.to_string()).collect();
        let by_sha: HashMap<String, Vec<PullRequestRecord>> = commits
            .into_iter()
            .map(|(sha, prs)| (sha.to_string(), prs))
            .collect();

        let mut forge = MockForge::new();
        forge
            .expect_list_commit_shas()
            .returning(move |_, _| Ok(shas.clone()));
        forge
            .expect_list_pull_requests_for_commit()
            .returning(move |sha| Ok(by_sha.get(sha).cloned().unwrap_or_default()));
        forge
    }

    async fn compose(forge: &MockForge, previous: &str, options: &ComposeOptions) -> String {
        Composer::new(forge)
            .compose("develop", "main", previous, options)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn groups_by_commit_type_with_issue_and_no_issue_sections() {
        let forge = forge_with(vec![
            ("sha1", vec![pr(10, "feat: add widget", "Resolves #5", "alice")]),
            ("sha2", vec![pr(11, "fix: typo", "", "bob")]),
        ]);
        let options = ComposeOptionsBuilder::default()
            .list_title("Changelog")
            .group_by_type(true)
            .build()
            .unwrap();

        let body = compose(&forge, "", &options).await;

        assert_eq!(
            body,
            format!(
                "### Changelog\n## Features\n- #5\n  - {}\n## Bug Fixes\n- {}",
                url(10),
                url(11)
            )
        );
    }

    #[tokio::test]
    async fn renders_flat_list_with_authors_and_prefix() {
        let forge = forge_with(vec![
            ("sha1", vec![pr(10, "feat: add widget", "Resolves #5", "alice")]),
            ("sha2", vec![pr(11, "typo", "no resolve line", "bob")]),
            ("sha3", vec![pr(12, "feat: more widget", "resolves: #5 #6", "")]),
        ]);
        let options = ComposeOptionsBuilder::default()
            .body_prefix("Release notes")
            .list_title("Changelog")
            .with_author(true)
            .build()
            .unwrap();

        let body = compose(&forge, "", &options).await;

        assert_eq!(
            body,
            [
                "Release notes".to_string(),
                "### Changelog".to_string(),
                "- #5".to_string(),
                format!("  - {} - alice", url(10)),
                format!("  - {}", url(12)),
                "- #6".to_string(),
                format!("  - {}", url(12)),
                format!("- {} - bob", url(11)),
            ]
            .join("\n")
        );
    }

    #[tokio::test]
    async fn empty_commit_range_renders_prefix_and_title_only() {
        let mut forge = MockForge::new();
        forge
            .expect_list_commit_shas()
            .returning(|_, _| Ok(vec![]));
        forge.expect_list_pull_requests_for_commit().times(0);

        let options = ComposeOptionsBuilder::default()
            .body_prefix("Prefix")
            .list_title("Changelog")
            .group_by_type(true)
            .build()
            .unwrap();

        let body = compose(&forge, "", &options).await;

        assert_eq!(body, "Prefix\n### Changelog");
    }

    #[tokio::test]
    async fn checked_items_survive_regeneration() {
        let previous = format!("### Changelog\n- [x] {} - alice", url(10));
        let make_forge = || {
            forge_with(vec![
                ("sha1", vec![pr(10, "feat: add widget", "", "alice")]),
                ("sha2", vec![pr(11, "fix: typo", "", "bob")]),
            ])
        };

        let with_author = ComposeOptionsBuilder::default()
            .with_checkbox(true)
            .with_author(true)
            .build()
            .unwrap();
        let body = compose(&make_forge(), &previous, &with_author).await;
        assert_eq!(
            body,
            format!("- [x] {} - alice\n- [ ] {} - bob", url(10), url(11))
        );

        let without_author = ComposeOptionsBuilder::default()
            .with_checkbox(true)
            .build()
            .unwrap();
        let body = compose(&make_forge(), &previous, &without_author).await;
        assert_eq!(body, format!("- [x] {}\n- [ ] {}", url(10), url(11)));
    }

    #[tokio::test]
    async fn issue_checkbox_is_independent_of_children() {
        let previous = format!("- [x] #5\n  - [ ] {}", url(10));
        let forge = forge_with(vec![(
            "sha1",
            vec![pr(10, "feat: add widget", "Resolves #5", "alice")],
        )]);
        let options = ComposeOptionsBuilder::default()
            .with_checkbox(true)
            .build()
            .unwrap();

        let body = compose(&forge, &previous, &options).await;

        assert_eq!(body, format!("- [x] #5\n  - [ ] {}", url(10)));
    }

    #[tokio::test]
    async fn checkbox_marks_are_dropped_when_disabled() {
        let previous = format!("- [x] {}", url(10));
        let forge = forge_with(vec![("sha1", vec![pr(10, "feat: a", "", "alice")])]);

        let body = compose(&forge, &previous, &ComposeOptions::default()).await;

        assert_eq!(body, format!("- {}", url(10)));
    }

    #[tokio::test]
    async fn rendered_checkmarks_read_back_exactly() {
        let previous = format!("- [x] #5\n- [x] {}\n- [x] {}", url(11), url(99));
        let forge = forge_with(vec![
            ("sha1", vec![pr(10, "feat: a", "Resolves #5", "alice")]),
            ("sha2", vec![pr(11, "fix: b", "", "bob")]),
            ("sha3", vec![pr(12, "docs: c", "Resolves #6", "carol")]),
        ]);
        let options = ComposeOptionsBuilder::default()
            .with_checkbox(true)
            .with_author(true)
            .group_by_type(true)
            .build()
            .unwrap();

        let body = compose(&forge, &previous, &options).await;
        let reread = ChecklistState::from_body(&body);

        let marked: HashSet<String> = body
            .lines()
            .filter_map(|line| line.trim_start().strip_prefix("- [x] "))
            .map(|rest| rest.split(" - ").next().unwrap_or_default().to_string())
            .collect();
        let reread_items: HashSet<String> =
            reread.iter().map(String::from).collect();

        assert_eq!(reread_items, marked);
        assert_eq!(
            reread_items,
            HashSet::from(["#5".to_string(), url(11)])
        );
    }

    #[tokio::test]
    async fn excluded_prs_do_not_contribute_issues() {
        let forge = forge_with(vec![
            ("sha1", vec![pr(1, "chore: Bump deps", "Resolves #7 #9", "bot")]),
            ("sha2", vec![pr(2, "feat: widget", "Resolves #9", "alice")]),
            ("sha3", vec![pr(3, "chore: bump lockfile", "", "bot")]),
        ]);
        let options = ComposeOptionsBuilder::default()
            .exclude_keywords(vec!["BUMP".to_string()])
            .build()
            .unwrap();

        let body = compose(&forge, "", &options).await;

        assert_eq!(body, format!("- #9\n  - {}", url(2)));
    }

    #[tokio::test]
    async fn open_prs_are_skipped() {
        let mut open = pr(20, "feat: draft", "Resolves #1", "alice");
        open.state = PrState::Open;
        let forge = forge_with(vec![("sha1", vec![open])]);

        let body = compose(&forge, "", &ComposeOptions::default()).await;

        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn pr_from_several_commits_is_listed_once_per_group() {
        let merged = pr(10, "feat: widget", "Resolves #5", "alice");
        let loose = pr(11, "tweak", "", "bob");
        let forge = forge_with(vec![
            ("sha1", vec![merged.clone(), loose.clone()]),
            ("sha2", vec![merged.clone()]),
            ("sha3", vec![loose.clone(), merged]),
        ]);

        let body = compose(&forge, "", &ComposeOptions::default()).await;

        assert_eq!(body, format!("- #5\n  - {}\n- {}", url(10), url(11)));
    }

    #[tokio::test]
    async fn others_section_is_rendered_last_only_when_needed() {
        let forge = forge_with(vec![
            ("sha1", vec![pr(1, "Tidy up", "", "")]),
            ("sha2", vec![pr(2, "chore: deps", "", "")]),
            ("sha3", vec![pr(3, "feat: x", "", "")]),
        ]);
        let options = ComposeOptionsBuilder::default()
            .group_by_type(true)
            .build()
            .unwrap();

        let body = compose(&forge, "", &options).await;
        assert_eq!(
            body,
            format!(
                "## Features\n- {}\n## Chores\n- {}\n## Others\n- {}",
                url(3),
                url(2),
                url(1)
            )
        );

        let forge = forge_with(vec![("sha1", vec![pr(3, "feat: x", "", "")])]);
        let body = compose(&forge, "", &options).await;
        assert!(!body.contains("## Others"));
    }

    #[tokio::test]
    async fn association_failure_aborts_composition() {
        let mut forge = MockForge::new();
        forge
            .expect_list_commit_shas()
            .returning(|_, _| Ok(vec!["sha1".into(), "sha2".into()]));
        forge
            .expect_list_pull_requests_for_commit()
            .times(1)
            .returning(|_| Err(ChangelogPrError::upstream("API rate limit exceeded")));

        let result = Composer::new(&forge)
            .compose("develop", "main", "", &ComposeOptions::default())
            .await;

        match result {
            Err(ChangelogPrError::UpstreamApi(msg)) => {
                assert_eq!(msg, "API rate limit exceeded")
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_branch_propagates() {
        let mut forge = MockForge::new();
        forge.expect_list_commit_shas().returning(|source, target| {
            Err(ChangelogPrError::BranchNotFound(vec![
                source.to_string(),
                target.to_string(),
            ]))
        });

        let result = Composer::new(&forge)
            .compose("nope", "main", "", &ComposeOptions::default())
            .await;

        assert!(matches!(result, Err(ChangelogPrError::BranchNotFound(_))));
    }

    #[test]
    fn grouping_partitions_every_pr() {
        let entries = vec![
            PrWithIssues::new(pr(1, "a", "Resolves #1 #2", ""), "resolves"),
            PrWithIssues::new(pr(2, "b", "", ""), "resolves"),
            PrWithIssues::new(pr(3, "c", "Resolves #2", ""), "resolves"),
            PrWithIssues::new(pr(2, "b", "", ""), "resolves"),
            PrWithIssues::new(pr(3, "c", "Resolves #2", ""), "resolves"),
        ];

        let groups = group_by_issue(entries);

        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["#1", "#2", NO_ISSUE]);

        let mut seen: HashSet<u64> = HashSet::new();
        for (issue, prs) in &groups {
            let ids: Vec<u64> = prs.iter().map(|e| e.pr.id).collect();
            let unique: HashSet<u64> = ids.iter().copied().collect();
            assert_eq!(ids.len(), unique.len(), "duplicate PR under {issue}");
            seen.extend(unique);
        }
        assert_eq!(seen, HashSet::from([1, 2, 3]));
        assert_eq!(
            groups.get("#2").unwrap().iter().map(|e| e.pr.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn dedup_keeps_first_position_and_last_record() {
        let first = PrWithIssues::new(pr(1, "old title", "", ""), "resolves");
        let other = PrWithIssues::new(pr(2, "b", "", ""), "resolves");
        let last = PrWithIssues::new(pr(1, "new title", "", ""), "resolves");

        let unique = dedup_by_id(vec![first, other, last]);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].pr.title, "new title");
        assert_eq!(unique[1].pr.id, 2);
    }

    #[test]
    fn missing_author_omits_suffix() {
        let groups = IssueGroups::from([(
            NO_ISSUE.to_string(),
            vec![PrWithIssues::new(pr(4, "x", "", ""), "resolves")],
        )]);
        let options = ComposeOptionsBuilder::default()
            .with_author(true)
            .build()
            .unwrap();

        let body = render(&groups, &ChecklistState::default(), &options);

        assert_eq!(body, format!("- {}", url(4)));
    }

    #[test]
    fn default_options_use_resolves_keyword() {
        let options = ComposeOptions::default();
        assert_eq!(options.resolve_keyword, DEFAULT_RESOLVE_KEYWORD);
        assert!(!options.group_by_type);
    }
}
