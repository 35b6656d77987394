//! The project setup wizard: selection, setup catalog, upload catalog,
//! dashboard.

use crate::catalog::Catalog;
use crate::config::WizardConfig;
use crate::controller::{WorkflowController, WorkflowState, WorkflowStep};
use crate::error::{Result, WorkflowError};
use crate::registry::{Project, ProjectRegistry};
use crate::remote::{FileListing, RemoteExecutor};
use crate::runner::{RunOutcome, RunState, StepRunner};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Drives a [`WorkflowController`] with a [`StepRunner`].
///
/// All user-facing failures end up in [`WorkflowState::last_error`].
pub struct Wizard {
    controller: WorkflowController,
    runner: StepRunner,
    registry: Arc<dyn ProjectRegistry>,
    files: Arc<dyn FileListing>,
    config: WizardConfig,
    /// Workflow step the loaded catalog belongs to
    loaded_for: Option<WorkflowStep>,
}

impl Wizard {
    pub fn new(
        config: WizardConfig,
        registry: Arc<dyn ProjectRegistry>,
        executor: Arc<dyn RemoteExecutor>,
        files: Arc<dyn FileListing>,
    ) -> Self {
        let runner = StepRunner::new(executor, config.runner());
        Self {
            controller: WorkflowController::new(),
            runner,
            registry,
            files,
            config,
            loaded_for: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        self.controller.state()
    }

    pub fn run_state(&self) -> &RunState {
        self.runner.state()
    }

    /// Watch progress of catalog runs.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.runner.subscribe()
    }

    /// Token that cancels the active catalog run from another task.
    pub fn cancel_token(&self) -> CancellationToken {
        self.runner.cancel_token()
    }

    pub async fn projects(&mut self) -> Result<Vec<Project>> {
        let result = self.registry.list_projects().await;
        self.recorded(result)
    }

    pub async fn create_project(&mut self, project_id: &str) -> Result<Project> {
        let result = self.registry.create(project_id).await;
        self.recorded(result)
    }

    /// Delete a project. Deleting the selected project resets the workflow.
    pub async fn delete_project(&mut self, project_id: &str) -> Result<Project> {
        let result = self.registry.delete(project_id).await;
        let project = self.recorded(result)?;

        if self.controller.state().selected_project_id() == Some(project_id) {
            self.reset();
        }
        Ok(project)
    }

    /// Select an existing project and enter setup. Any run in progress for
    /// the previous selection is abandoned.
    pub async fn select_project(&mut self, project_id: &str) -> Result<()> {
        if !project_id.trim().is_empty() {
            let found = self.registry.get(project_id).await;
            if self.recorded(found)?.is_none() {
                let err = WorkflowError::NotFound(project_id.to_string());
                self.controller.record(&err);
                return Err(err);
            }
        }

        self.controller.select_project(project_id)?;
        self.abandon_run();
        Ok(())
    }

    /// Run the setup catalog for the selected project.
    pub async fn run_setup(&mut self) -> Result<RunOutcome> {
        let project_id = self.require(WorkflowStep::Setup, "run setup")?;

        self.runner.load(self.config.setup.clone(), &project_id);
        self.loaded_for = Some(WorkflowStep::Setup);
        let outcome = self.runner.run().await?;
        self.settle(outcome)
    }

    /// Fetch pending files and run the upload catalog for the selected
    /// project.
    pub async fn run_upload(&mut self) -> Result<RunOutcome> {
        let project_id = self.require(WorkflowStep::Upload, "run upload")?;

        let files = match self.files.list_pending_files(&project_id).await {
            Ok(files) => files,
            Err(e) => {
                let err = WorkflowError::RemoteOperation {
                    index: 0,
                    title: "List pending files".to_string(),
                    detail: format!("Failed to load pending file list: {}", e),
                };
                self.controller.record(&err);
                return Err(err);
            }
        };

        tracing::info!(project = %project_id, files = files.len(), "Uploading pending files");

        let catalog = Catalog::upload(&project_id, &files, &self.config.upload)
            .map_err(|e| WorkflowError::Config(format!("{:#}", e)));
        let catalog = self.recorded(catalog)?;

        self.runner.load(catalog, &project_id);
        self.loaded_for = Some(WorkflowStep::Upload);
        let outcome = self.runner.run().await?;
        self.settle(outcome)
    }

    /// Re-invoke the failed step of the current catalog.
    ///
    /// Fails with [`WorkflowError::State`] when the workflow has moved on
    /// from the step the catalog was loaded for.
    pub async fn retry(&mut self) -> Result<RunOutcome> {
        let step = self.controller.step();
        if self.loaded_for != Some(step) {
            let err = WorkflowError::State(format!("no catalog to retry in {}", step));
            tracing::error!(error = %err, "Rejected wizard operation");
            return Err(err);
        }

        let outcome = self.runner.retry().await?;
        self.settle(outcome)
    }

    /// Abandon any run and return to the project manager.
    pub fn reset(&mut self) {
        self.abandon_run();
        self.controller.reset();
    }

    fn abandon_run(&mut self) {
        self.runner.cancel();
        self.loaded_for = None;
    }

    /// Apply the workflow transition a finished run implies.
    fn settle(&mut self, outcome: RunOutcome) -> Result<RunOutcome> {
        match &outcome {
            RunOutcome::Completed { .. } => match self.loaded_for.take() {
                Some(WorkflowStep::Setup) => self.controller.complete_setup()?,
                Some(WorkflowStep::Upload) => self.controller.complete_upload()?,
                step => tracing::warn!(step = ?step, "Catalog completed outside setup/upload"),
            },
            RunOutcome::Failed { index, error } => {
                let title = self
                    .runner
                    .catalog()
                    .steps
                    .get(*index)
                    .map(|s| s.title.clone())
                    .unwrap_or_default();
                self.controller.record(&WorkflowError::RemoteOperation {
                    index: *index,
                    title,
                    detail: error.clone(),
                });
            }
            RunOutcome::Cancelled => {}
        }
        Ok(outcome)
    }

    fn require(&self, step: WorkflowStep, action: &str) -> Result<String> {
        let state = self.controller.state();
        match state.selected_project_id() {
            Some(project_id) if state.step() == step => Ok(project_id.to_string()),
            _ => {
                let err = WorkflowError::State(format!("cannot {} from {}", action, state.step()));
                tracing::error!(error = %err, "Rejected wizard operation");
                Err(err)
            }
        }
    }

    fn recorded<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.controller.record(err);
        }
        result
    }
}
