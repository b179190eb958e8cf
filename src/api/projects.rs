//
//  bitbucket-report
//  api/projects.rs
//

//! Project records and the paginated project fetch.
//!
//! Projects are lightweight containers grouping repositories within a
//! workspace. Only the fields used for listing are modeled; the project name
//! is treated as the identity for filtering purposes.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiError, BitbucketClient};

/// A Bitbucket Cloud project, one element of a `projects` listing page.
///
/// # Example
///
/// ```rust
/// use bitbucket_report::api::projects::Project;
///
/// let json = r#"{"name": "Tools", "type": "project", "key": "TOOL"}"#;
/// let project: Project = serde_json::from_str(json).unwrap();
/// assert_eq!(project.key, "TOOL");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    /// Display name, assumed unique within a workspace.
    #[serde(default)]
    pub name: String,

    /// Object type reported by the service (normally `project`).
    #[serde(default, rename = "type")]
    pub project_type: String,

    /// Short project key, e.g. `TOOL`.
    #[serde(default)]
    pub key: String,
}

/// Compares two projects by name, ascending.
pub fn compare_projects(a: &Project, b: &Project) -> Ordering {
    a.name.cmp(&b.name)
}

/// Reads all projects in the client's workspace.
///
/// Pages through `GET {root}/workspaces/{workspace}/projects?pagelen=100`
/// following the `next` cursor, then sorts the accumulated list by project
/// name.
pub async fn read_projects(client: &BitbucketClient) -> Result<Vec<Project>, ApiError> {
    let mut projects: Vec<Project> = client.get_all_pages(client.projects_url()).await?;
    info!(count = projects.len(), "read projects");

    projects.sort_by(compare_projects);
    Ok(projects)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str) -> Project {
        Project {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_projects_sort_by_name() {
        let mut list = vec![project("zeta"), project("Alpha"), project("beta")];
        list.sort_by(compare_projects);
        let names: Vec<&str> = list.iter().map(|p| p.name.as_str()).collect();
        // Ordinal comparison: uppercase sorts before lowercase.
        assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_type_field_is_renamed() {
        let p: Project =
            serde_json::from_str(r#"{"name": "X", "type": "project", "key": "K"}"#).unwrap();
        assert_eq!(p.project_type, "project");
    }
}
