//
//  bitbucket-report
//  api/issues.rs
//

//! Issue records, enrichment, and the composite issue sort.
//!
//! Issues come back from the tracker endpoint as bare wire records. Before
//! they are usable for reporting each one is enriched: the owning repository
//! is attached, a sentinel assignee is substituted when none is set, the age
//! in days is computed once, and key/value properties embedded in the issue
//! body are parsed out. The enriched list is then sorted with a composite
//! comparator so that reports group naturally by assignee and repository.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::repositories::Repository;
use crate::api::{ApiError, BitbucketClient};

/// Display name used when an issue has no assignee.
///
/// Using a sentinel instead of an empty string keeps report output and exact
/// assignee filtering unambiguous.
pub const NOT_ASSIGNED: &str = "NotAssigned";

/// A Bitbucket account as it appears on an issue (reporter or assignee).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    /// Human-readable display name.
    #[serde(default)]
    pub display_name: String,

    /// Account nickname.
    #[serde(default)]
    pub nickname: String,
}

impl User {
    /// Returns the sentinel user substituted for a missing assignee.
    pub fn not_assigned() -> Self {
        Self {
            display_name: NOT_ASSIGNED.to_string(),
            nickname: NOT_ASSIGNED.to_string(),
        }
    }
}

/// One hypermedia link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Link {
    /// Target URL.
    #[serde(default)]
    pub href: String,

    /// Optional link name.
    #[serde(default)]
    pub name: String,
}

/// The links object attached to an issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueLinks {
    /// Browser-facing issue page.
    #[serde(default)]
    pub html: Option<Link>,

    /// API URL of the issue itself.
    #[serde(default, rename = "self")]
    pub self_link: Option<Link>,

    /// Attachments listing.
    #[serde(default)]
    pub attachments: Option<Link>,

    /// Comments listing.
    #[serde(default)]
    pub comments: Option<Link>,
}

/// The rendered body of an issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueContent {
    /// Source text as entered, including any embedded property lines.
    #[serde(default)]
    pub raw: String,

    /// Markup language of `raw` (normally `markdown`).
    #[serde(default)]
    pub markup: String,

    /// Rendered HTML.
    #[serde(default)]
    pub html: String,
}

/// A Bitbucket Cloud issue, one element of an issue-tracker listing page.
///
/// Wire fields are filled by deserialization; the remaining fields are
/// populated by [`Issue::enrich`] after the fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number, unique within its repository.
    #[serde(default)]
    pub id: i64,

    /// One-line summary.
    #[serde(default)]
    pub title: String,

    /// Workflow state (`new`, `open`, `resolved`, `closed`, ...).
    #[serde(default)]
    pub state: String,

    /// Issue kind (`bug`, `task`, `enhancement`, `proposal`).
    #[serde(default)]
    pub kind: String,

    /// Issue priority (`trivial`, `minor`, `major`, `critical`, `blocker`).
    #[serde(default)]
    pub priority: String,

    /// Account that created the issue.
    #[serde(default)]
    pub reporter: Option<User>,

    /// Account the issue is assigned to, if any.
    #[serde(default)]
    pub assignee: Option<User>,

    /// Creation timestamp as sent by the server (ISO-8601).
    #[serde(default)]
    pub created_on: String,

    /// Last-update timestamp as sent by the server (ISO-8601).
    #[serde(default)]
    pub updated_on: String,

    /// Last-edit timestamp as sent by the server (ISO-8601), if any.
    #[serde(default)]
    pub edited_on: Option<String>,

    /// Issue body.
    #[serde(default)]
    pub content: IssueContent,

    /// Hypermedia links.
    #[serde(default)]
    pub links: IssueLinks,

    /// Vote count.
    #[serde(default)]
    pub votes: i64,

    /// The repository the issue was read from.
    #[serde(skip)]
    pub repository: Option<Repository>,

    /// Whole days since creation, inclusive of the creation day.
    #[serde(skip)]
    pub age_days: i64,

    /// `created_on` parsed to a datetime, when parseable.
    #[serde(skip)]
    pub created_at: Option<DateTime<FixedOffset>>,

    /// `updated_on` parsed to a datetime, when parseable.
    #[serde(skip)]
    pub updated_at: Option<DateTime<FixedOffset>>,

    /// `edited_on` parsed to a datetime, when parseable.
    #[serde(skip)]
    pub edited_at: Option<DateTime<FixedOffset>>,

    /// Key/value properties parsed from `//` lines in the issue body.
    #[serde(skip)]
    pub properties: HashMap<String, String>,
}

impl Issue {
    /// Whether the issue counts as open for filtering purposes.
    ///
    /// Only the `new` and `open` states are open; every other state
    /// (`resolved`, `closed`, `invalid`, ...) is closed.
    pub fn is_open(&self) -> bool {
        matches!(self.state.as_str(), "new" | "open")
    }

    /// Display name of the assignee, or the empty string when unassigned.
    pub fn assignee_name(&self) -> &str {
        self.assignee
            .as_ref()
            .map(|user| user.display_name.as_str())
            .unwrap_or("")
    }

    /// Name of the owning repository, or the empty string before enrichment.
    pub fn repository_name(&self) -> &str {
        self.repository
            .as_ref()
            .map(|repo| repo.name.as_str())
            .unwrap_or("")
    }

    /// Fills in the derived fields after deserialization.
    ///
    /// Attaches the owning repository, substitutes the sentinel assignee when
    /// none is set, parses the timestamps, computes the age relative to
    /// `today`, and parses embedded properties from the issue body.
    pub fn enrich(&mut self, repository: &Repository, today: NaiveDate) {
        self.repository = Some(repository.clone());

        if self.assignee.is_none() {
            self.assignee = Some(User::not_assigned());
        }

        self.created_at = DateTime::parse_from_rfc3339(&self.created_on).ok();
        self.updated_at = DateTime::parse_from_rfc3339(&self.updated_on).ok();
        self.edited_at = self
            .edited_on
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok());

        if let Some(created) = self.created_at {
            self.age_days = compute_age_days(created.date_naive(), today);
        }

        self.properties = parse_properties(&self.content.raw);
    }
}

/// Computes the age of an issue in whole days, inclusive of the creation day.
///
/// An issue created today has age 1.
pub fn compute_age_days(created: NaiveDate, today: NaiveDate) -> i64 {
    (today - created).num_days() + 1
}

/// Parses key/value properties embedded in an issue body.
///
/// A property line starts with `//` and contains at least one `=`. The text
/// after the `//` is split on whitespace; each token that splits on `=` into
/// exactly two parts contributes a trimmed key/value pair. Tokens without an
/// `=` or with more than one are dropped without comment, as is every
/// non-property line.
///
/// # Example
///
/// ```rust
/// use bitbucket_report::api::issues::parse_properties;
///
/// let props = parse_properties("Fix the widget.\n// component=ui version=1.2\n");
/// assert_eq!(props.get("component").map(String::as_str), Some("ui"));
/// assert_eq!(props.get("version").map(String::as_str), Some("1.2"));
/// ```
pub fn parse_properties(raw: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();

    for line in raw.lines() {
        let line = line.trim_start();
        let Some(rest) = line.strip_prefix("//") else {
            continue;
        };
        if !rest.contains('=') {
            continue;
        }
        for token in rest.split_whitespace() {
            let mut parts = token.split('=');
            if let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) {
                let key = key.trim();
                let value = value.trim();
                if !key.is_empty() {
                    properties.insert(key.to_string(), value.to_string());
                }
            }
        }
    }

    properties
}

/// Priority key used for ordering.
///
/// `blocker` is remapped so that the lexical order of the keys matches the
/// intended severity order: critical < blocker < major < minor < trivial.
fn priority_sort_key(priority: &str) -> &str {
    if priority == "blocker" {
        "dlocker"
    } else {
        priority
    }
}

/// Kind key used for ordering.
///
/// `task` is remapped so that the lexical order of the keys matches the
/// intended order: bug < task < enhancement < proposal.
fn kind_sort_key(kind: &str) -> &str {
    if kind == "task" {
        "c-task"
    } else {
        kind
    }
}

/// Compares assignee display names, sorting unassigned (empty) last.
fn compare_assignees(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

/// Composite issue ordering for reports.
///
/// Precedence, first difference wins:
/// 1. assignee display name ascending, unassigned last
/// 2. repository name ascending
/// 3. priority, most severe first (critical, blocker, major, minor, trivial)
/// 4. kind (bug, task, enhancement, proposal)
/// 5. age in days descending, so older issues surface first
/// 6. title ascending
pub fn compare_issues(a: &Issue, b: &Issue) -> Ordering {
    compare_assignees(a.assignee_name(), b.assignee_name())
        .then_with(|| a.repository_name().cmp(b.repository_name()))
        .then_with(|| priority_sort_key(&a.priority).cmp(priority_sort_key(&b.priority)))
        .then_with(|| kind_sort_key(&a.kind).cmp(kind_sort_key(&b.kind)))
        .then_with(|| b.age_days.cmp(&a.age_days))
        .then_with(|| a.title.cmp(&b.title))
}

/// Reads all issues of one repository, enriched and sorted.
///
/// When the repository's issue tracker is disabled (`has_issues == false`)
/// this returns an empty list without making a network call. Otherwise it
/// pages through `GET {root}/repositories/{workspace}/{slug}/issues?pagelen=100`,
/// enriches each issue, and sorts with [`compare_issues`].
pub async fn read_repository_issues(
    client: &BitbucketClient,
    repository: &Repository,
) -> Result<Vec<Issue>, ApiError> {
    if !repository.has_issues {
        debug!(
            repository = %repository.name,
            "issue tracker disabled, skipping"
        );
        return Ok(Vec::new());
    }

    let mut issues: Vec<Issue> = client
        .get_all_pages(client.repository_issues_url(&repository.slug))
        .await?;
    info!(
        repository = %repository.name,
        count = issues.len(),
        "read issues"
    );

    let today = Local::now().date_naive();
    for issue in &mut issues {
        issue.enrich(repository, today);
    }

    issues.sort_by(compare_issues);
    Ok(issues)
}
