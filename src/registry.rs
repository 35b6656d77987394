//! Project registry: CRUD over project identifiers.

use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// A registered project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Project {
    fn new(project_id: &str, name: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Registry of project identifiers.
#[async_trait]
pub trait ProjectRegistry: Send + Sync {
    /// All projects, in creation order.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Look up a project by id.
    async fn get(&self, project_id: &str) -> Result<Option<Project>>;

    /// Register a new project. Fails with `Conflict` if the id exists.
    async fn create(&self, project_id: &str) -> Result<Project>;

    /// Remove a project. Fails with `NotFound` if the id is unknown.
    async fn delete(&self, project_id: &str) -> Result<Project>;

    /// All project ids, in creation order.
    async fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .list_projects()
            .await?
            .into_iter()
            .map(|p| p.project_id)
            .collect())
    }
}

/// Check a project id: non-empty and free of path separators.
pub fn validate_project_id(project_id: &str) -> Result<()> {
    if project_id.trim().is_empty() {
        return Err(WorkflowError::Validation(
            "Project ID cannot be empty".to_string(),
        ));
    }
    if project_id.contains("..") || project_id.contains('/') || project_id.contains('\\') {
        return Err(WorkflowError::Validation(format!(
            "Invalid project ID: {}",
            project_id
        )));
    }
    Ok(())
}

/// Memory-only registry. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    projects: RwLock<Vec<Project>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the sample projects.
    pub fn seeded() -> Self {
        let projects = vec![
            Project::new("project-alpha", "Project Alpha"),
            Project::new("project-beta", "Project Beta"),
            Project::new("project-gamma", "Project Gamma"),
        ];
        Self {
            projects: RwLock::new(projects),
        }
    }
}

#[async_trait]
impl ProjectRegistry for InMemoryRegistry {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.read().await.clone())
    }

    async fn get(&self, project_id: &str) -> Result<Option<Project>> {
        Ok(self
            .projects
            .read()
            .await
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned())
    }

    async fn create(&self, project_id: &str) -> Result<Project> {
        validate_project_id(project_id)?;

        let mut projects = self.projects.write().await;
        if projects.iter().any(|p| p.project_id == project_id) {
            return Err(WorkflowError::Conflict(project_id.to_string()));
        }

        let project = Project::new(project_id, project_id);
        projects.push(project.clone());
        tracing::info!(project = %project_id, "Created project");
        Ok(project)
    }

    async fn delete(&self, project_id: &str) -> Result<Project> {
        let mut projects = self.projects.write().await;
        let index = projects
            .iter()
            .position(|p| p.project_id == project_id)
            .ok_or_else(|| WorkflowError::NotFound(project_id.to_string()))?;

        let project = projects.remove(index);
        tracing::info!(project = %project_id, "Deleted project");
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_list() {
        let registry = InMemoryRegistry::new();
        registry.create("demo").await.unwrap();
        registry.create("other").await.unwrap();

        assert_eq!(registry.list().await.unwrap(), vec!["demo", "other"]);
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let registry = InMemoryRegistry::new();
        registry.create("demo").await.unwrap();

        let err = registry.create("demo").await.unwrap_err();
        assert_eq!(err, WorkflowError::Conflict("demo".to_string()));
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_not_found() {
        let registry = InMemoryRegistry::new();

        let err = registry.delete("missing").await.unwrap_err();
        assert_eq!(err, WorkflowError::NotFound("missing".to_string()));
    }

    #[tokio::test]
    async fn test_delete_removes_project() {
        let registry = InMemoryRegistry::seeded();

        let removed = registry.delete("project-beta").await.unwrap();
        assert_eq!(removed.name, "Project Beta");
        assert_eq!(
            registry.list().await.unwrap(),
            vec!["project-alpha", "project-gamma"]
        );
        assert!(registry.get("project-beta").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_invalid_ids() {
        let registry = InMemoryRegistry::new();

        for id in ["", "   ", "../etc", "a/b", "a\\b"] {
            let err = registry.create(id).await.unwrap_err();
            assert!(matches!(err, WorkflowError::Validation(_)), "{id:?}");
        }
        assert!(registry.list().await.unwrap().is_empty());
    }
}
