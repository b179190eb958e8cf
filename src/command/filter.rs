//
//  bitbucket-report
//  command/filter.rs
//

//! Name and issue filters applied after fetching.
//!
//! Filtering happens client-side on the accumulated lists. Name patterns are
//! globs by default (`*` matches any run of characters, `.` is literal); a
//! `regex:` prefix switches to a raw regular expression for callers that need
//! more than globbing.

use anyhow::{Context, Result};
use regex::Regex;

/// Case-insensitive prefix selecting raw regular-expression syntax.
const REGEX_PREFIX: &str = "regex:";

/// Translates a glob pattern into an anchored regular expression.
///
/// `*` becomes `.*` and literal `.` is escaped; everything else passes
/// through. The result is anchored on both ends so the pattern must match the
/// whole name, e.g. `Proj*` matches `Project1` but not `MyProject`.
fn glob_to_regex(glob: &str) -> String {
    let mut pattern = String::with_capacity(glob.len() + 4);
    pattern.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '.' => pattern.push_str("\\."),
            other => pattern.push(other),
        }
    }
    pattern.push('$');
    pattern
}

/// A compiled name filter.
///
/// With no pattern every name matches. A pattern is interpreted as a glob
/// unless it carries the `regex:` prefix (case-insensitive), in which case
/// the remainder is compiled as-is.
#[derive(Debug, Clone)]
pub enum NameFilter {
    /// Match everything.
    None,
    /// Match names against the compiled pattern.
    Pattern(Regex),
}

impl NameFilter {
    /// Compiles a filter from an optional pattern string.
    ///
    /// # Errors
    ///
    /// Returns an error when the pattern does not compile, naming the
    /// offending pattern.
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let Some(pattern) = pattern else {
            return Ok(Self::None);
        };
        if pattern.is_empty() {
            return Ok(Self::None);
        }

        let source = match pattern.get(..REGEX_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(REGEX_PREFIX) => {
                pattern[REGEX_PREFIX.len()..].to_string()
            }
            _ => glob_to_regex(pattern),
        };

        let regex = Regex::new(&source)
            .with_context(|| format!("Invalid filter pattern \"{pattern}\""))?;
        Ok(Self::Pattern(regex))
    }

    /// Whether the name passes the filter.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::None => true,
            Self::Pattern(regex) => regex.is_match(name),
        }
    }
}

/// Criteria applied to enriched issues.
#[derive(Debug, Clone)]
pub struct IssueFilter {
    /// Title pattern.
    pub title: NameFilter,
    /// Exact assignee display name, when set.
    pub assignee: Option<String>,
    /// Include issues in an open state (`new`, `open`).
    pub include_open: bool,
    /// Include issues in any closed state.
    pub include_closed: bool,
}

impl IssueFilter {
    /// Whether the issue passes all criteria.
    ///
    /// With both `include_open` and `include_closed` false nothing passes;
    /// that combination is allowed and simply yields an empty report.
    pub fn matches(&self, issue: &crate::api::issues::Issue) -> bool {
        let state_included = (issue.is_open() && self.include_open)
            || (!issue.is_open() && self.include_closed);
        if !state_included {
            return false;
        }

        if let Some(assignee) = &self.assignee {
            if issue.assignee_name() != assignee {
                return false;
            }
        }

        self.title.matches(&issue.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::issues::{Issue, User};

    fn issue(title: &str, state: &str, assignee: &str) -> Issue {
        Issue {
            title: title.to_string(),
            state: state.to_string(),
            assignee: Some(User {
                display_name: assignee.to_string(),
                nickname: assignee.to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_glob_matches_whole_name() {
        let filter = NameFilter::new(Some("Proj*")).unwrap();
        assert!(filter.matches("Project1"));
        assert!(filter.matches("ProjectX"));
        assert!(filter.matches("Proj"));
        assert!(!filter.matches("MyProject"));
    }

    #[test]
    fn test_glob_dot_is_literal() {
        let filter = NameFilter::new(Some("repo.io")).unwrap();
        assert!(filter.matches("repo.io"));
        assert!(!filter.matches("repoXio"));
    }

    #[test]
    fn test_regex_prefix_selects_raw_regex() {
        let filter = NameFilter::new(Some("regex:^repo-[0-9]+$")).unwrap();
        assert!(filter.matches("repo-42"));
        assert!(!filter.matches("repo-x"));

        // Prefix match is case-insensitive.
        let filter = NameFilter::new(Some("REGEX:a|b")).unwrap();
        assert!(filter.matches("a"));
        assert!(filter.matches("b"));
    }

    #[test]
    fn test_missing_or_empty_pattern_matches_everything() {
        assert!(NameFilter::new(None).unwrap().matches("anything"));
        assert!(NameFilter::new(Some("")).unwrap().matches("anything"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = NameFilter::new(Some("regex:[unclosed")).unwrap_err();
        assert!(err.to_string().contains("[unclosed"));
    }

    #[test]
    fn test_open_closed_inclusion() {
        let base = IssueFilter {
            title: NameFilter::None,
            assignee: None,
            include_open: true,
            include_closed: false,
        };
        let open = issue("t", "open", "A");
        let new = issue("t", "new", "A");
        let closed = issue("t", "resolved", "A");

        assert!(base.matches(&open));
        assert!(base.matches(&new));
        assert!(!base.matches(&closed));

        let closed_only = IssueFilter {
            include_open: false,
            include_closed: true,
            ..base.clone()
        };
        assert!(!closed_only.matches(&open));
        assert!(closed_only.matches(&closed));
    }

    #[test]
    fn test_both_inclusion_flags_false_excludes_everything() {
        let filter = IssueFilter {
            title: NameFilter::None,
            assignee: None,
            include_open: false,
            include_closed: false,
        };
        assert!(!filter.matches(&issue("t", "open", "A")));
        assert!(!filter.matches(&issue("t", "closed", "A")));
    }

    #[test]
    fn test_assignee_is_exact_match() {
        let filter = IssueFilter {
            title: NameFilter::None,
            assignee: Some("Alice".to_string()),
            include_open: true,
            include_closed: true,
        };
        assert!(filter.matches(&issue("t", "open", "Alice")));
        assert!(!filter.matches(&issue("t", "open", "Alicia")));
        assert!(!filter.matches(&issue("t", "open", "alice")));
    }
}
