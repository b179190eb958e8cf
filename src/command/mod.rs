//
//  bitbucket-report
//  command/mod.rs
//

//! Listing operations and their orchestration.
//!
//! An [`Operation`] names one of the supported listings. [`execute`] fetches
//! the data through the API client, applies the filters, and appends the
//! result rows to the caller's [`TableSink`]. The row count it returns feeds
//! the count-property side channel printed by the CLI.

use anyhow::Result;
use tracing::info;

use crate::api::issues::{self, compare_issues, Issue};
use crate::api::projects;
use crate::api::repositories;
use crate::api::BitbucketClient;
use crate::output::{Cell, ColumnType, TableSink};

pub mod filter;

use filter::{IssueFilter, NameFilter};

/// The closed set of listing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// List the projects of the workspace.
    ListProjects,
    /// List the repositories of the workspace.
    ListRepositories,
    /// List the issues of the workspace's repositories.
    ListRepositoryIssues,
}

impl Operation {
    /// Canonical operation names, in display order.
    const TABLE: [(Operation, &'static str, &'static str); 3] = [
        (
            Operation::ListProjects,
            "ListProjects",
            "List the projects of a workspace",
        ),
        (
            Operation::ListRepositories,
            "ListRepositories",
            "List the repositories of a workspace",
        ),
        (
            Operation::ListRepositoryIssues,
            "ListRepositoryIssues",
            "List the issues of a workspace's repositories",
        ),
    ];

    /// Looks up an operation by name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, canonical, _)| canonical.eq_ignore_ascii_case(name))
            .map(|(operation, _, _)| *operation)
    }

    /// Canonical name of the operation.
    pub fn as_str(&self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(operation, _, _)| operation == self)
            .map(|(_, canonical, _)| *canonical)
            .unwrap_or("")
    }

    /// One-line description for help output.
    pub fn description(&self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(operation, _, _)| operation == self)
            .map(|(_, _, description)| *description)
            .unwrap_or("")
    }

    /// All operations with their canonical names, in display order.
    pub fn choices() -> impl Iterator<Item = (Operation, &'static str)> {
        Self::TABLE
            .iter()
            .map(|(operation, canonical, _)| (*operation, *canonical))
    }
}

/// Options shared by the listing operations.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Name filter: project or repository name depending on the operation.
    /// For the issues listing this selects which repositories are read.
    pub name_filter: NameFilter,

    /// Issue criteria, used only by the issues listing.
    pub issue_filter: IssueFilter,

    /// Names of embedded issue properties to add as extra columns, used only
    /// by the issues listing.
    pub properties: Vec<String>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            name_filter: NameFilter::None,
            issue_filter: IssueFilter {
                title: NameFilter::None,
                assignee: None,
                include_open: true,
                include_closed: false,
            },
            properties: Vec::new(),
        }
    }
}

/// Runs one listing operation, appending rows to `table`.
///
/// Returns the number of rows the table holds afterwards, which the CLI
/// publishes through the count property.
pub async fn execute(
    client: &BitbucketClient,
    operation: Operation,
    options: &ExecuteOptions,
    table: &mut dyn TableSink,
) -> Result<usize> {
    info!(operation = operation.as_str(), "executing");

    match operation {
        Operation::ListProjects => list_projects(client, options, table).await?,
        Operation::ListRepositories => list_repositories(client, options, table).await?,
        Operation::ListRepositoryIssues => list_repository_issues(client, options, table).await?,
    }

    Ok(table.row_count())
}

async fn list_projects(
    client: &BitbucketClient,
    options: &ExecuteOptions,
    table: &mut dyn TableSink,
) -> Result<()> {
    table.ensure_column("Name", ColumnType::String);
    table.ensure_column("Type", ColumnType::String);
    table.ensure_column("Key", ColumnType::String);

    for project in projects::read_projects(client).await? {
        if !options.name_filter.matches(&project.name) {
            continue;
        }
        table.append(vec![
            Cell::Str(project.name),
            Cell::Str(project.project_type),
            Cell::Str(project.key),
        ])?;
    }
    Ok(())
}

async fn list_repositories(
    client: &BitbucketClient,
    options: &ExecuteOptions,
    table: &mut dyn TableSink,
) -> Result<()> {
    table.ensure_column("Name", ColumnType::String);
    table.ensure_column("Slug", ColumnType::String);
    table.ensure_column("CreatedOn", ColumnType::DateTime);
    table.ensure_column("UpdatedOn", ColumnType::DateTime);
    table.ensure_column("HasIssues", ColumnType::Bool);
    table.ensure_column("IsPrivate", ColumnType::Bool);
    table.ensure_column("Size", ColumnType::Int);
    table.ensure_column("Description", ColumnType::String);

    for repository in repositories::read_repositories(client).await? {
        if !options.name_filter.matches(&repository.name) {
            continue;
        }
        table.append(vec![
            Cell::Str(repository.name),
            Cell::Str(repository.slug),
            Cell::from_datetime(repository.created_at),
            Cell::from_datetime(repository.updated_at),
            Cell::Bool(repository.has_issues),
            Cell::Bool(repository.is_private),
            Cell::Int(repository.size),
            Cell::from_str_or_null(&repository.description),
        ])?;
    }
    Ok(())
}

async fn list_repository_issues(
    client: &BitbucketClient,
    options: &ExecuteOptions,
    table: &mut dyn TableSink,
) -> Result<()> {
    table.ensure_column("RepositoryName", ColumnType::String);
    for property in &options.properties {
        table.ensure_column(property, ColumnType::String);
    }
    table.ensure_column("Id", ColumnType::Int);
    table.ensure_column("Link", ColumnType::String);
    table.ensure_column("Title", ColumnType::String);
    table.ensure_column("Priority", ColumnType::String);
    table.ensure_column("Kind", ColumnType::String);
    table.ensure_column("State", ColumnType::String);
    table.ensure_column("Assignee", ColumnType::String);
    table.ensure_column("Reporter", ColumnType::String);
    table.ensure_column("AgeDays", ColumnType::Int);
    table.ensure_column("CreatedOn", ColumnType::DateTime);
    table.ensure_column("UpdatedOn", ColumnType::DateTime);
    table.ensure_column("EditedOn", ColumnType::DateTime);

    // Accumulate across all matching repositories, then re-sort the combined
    // list so the report interleaves repositories per the issue ordering.
    let mut all_issues: Vec<Issue> = Vec::new();
    for repository in repositories::read_repositories(client).await? {
        if !options.name_filter.matches(&repository.name) {
            continue;
        }
        let issues = issues::read_repository_issues(client, &repository).await?;
        all_issues.extend(
            issues
                .into_iter()
                .filter(|issue| options.issue_filter.matches(issue)),
        );
    }
    all_issues.sort_by(compare_issues);

    for issue in all_issues {
        let mut row = vec![Cell::Str(issue.repository_name().to_string())];
        for property in &options.properties {
            match issue.properties.get(property) {
                Some(value) => row.push(Cell::Str(value.clone())),
                None => row.push(Cell::Null),
            }
        }
        let link = issue
            .links
            .html
            .as_ref()
            .map(|link| link.href.as_str())
            .unwrap_or("");
        let reporter = issue
            .reporter
            .as_ref()
            .map(|user| user.display_name.as_str())
            .unwrap_or("");
        row.extend([
            Cell::Int(issue.id),
            Cell::from_str_or_null(link),
            Cell::Str(issue.title.clone()),
            Cell::Str(issue.priority.clone()),
            Cell::Str(issue.kind.clone()),
            Cell::Str(issue.state.clone()),
            Cell::Str(issue.assignee_name().to_string()),
            Cell::from_str_or_null(reporter),
            Cell::Int(issue.age_days),
            Cell::from_datetime(issue.created_at),
            Cell::from_datetime(issue.updated_at),
            Cell::from_datetime(issue.edited_at),
        ]);
        table.append(row)?;
    }
    Ok(())
}
