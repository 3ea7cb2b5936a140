//! Reads which changelog entries were ticked in a previous pull request body
//! so the marks survive regeneration.
use regex::Regex;
use std::{collections::HashSet, sync::LazyLock};

// `- [x] <text>` with an optional ` - <author>` suffix
static CHECKED_ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*- \[x\] (?<text>.+?)(?: - .*)?$").unwrap()
});

/// Texts (pull request URLs or issue tokens) of the checked items found in
/// a body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistState {
    checked: HashSet<String>,
}

impl ChecklistState {
    pub fn from_body(body: &str) -> Self {
        let checked = body
            .lines()
            .filter_map(|line| CHECKED_ITEM_REGEX.captures(line))
            .map(|caps| caps["text"].trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        Self { checked }
    }

    pub fn is_checked(&self, text: &str) -> bool {
        self.checked.contains(text)
    }

    pub(crate) fn len(&self) -> usize {
        self.checked.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &str> {
        self.checked.iter().map(String::as_str)
    }
}
