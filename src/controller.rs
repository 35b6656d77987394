//! Workflow controller: the linear project → setup → upload → dashboard
//! progression.

use crate::error::{Result, WorkflowError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of the user in the wizard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowStep {
    #[default]
    ProjectManager,
    Setup,
    Upload,
    Dashboard,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStep::ProjectManager => "projectManager",
            WorkflowStep::Setup => "setup",
            WorkflowStep::Upload => "upload",
            WorkflowStep::Dashboard => "dashboard",
        };
        f.write_str(name)
    }
}

/// Snapshot of the workflow.
///
/// `selected_project_id` is set exactly when `step` is not `ProjectManager`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    step: WorkflowStep,
    selected_project_id: Option<String>,
    last_error: Option<String>,
}

impl WorkflowState {
    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn selected_project_id(&self) -> Option<&str> {
        self.selected_project_id.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Owns the [`WorkflowState`] and applies transitions to it.
///
/// Out-of-order transitions are programming errors: they panic in debug
/// builds and are logged no-ops returning [`WorkflowError::State`] otherwise.
#[derive(Debug, Default)]
pub struct WorkflowController {
    state: WorkflowState,
}

impl WorkflowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn step(&self) -> WorkflowStep {
        self.state.step
    }

    /// Select a project and enter setup.
    pub fn select_project(&mut self, project_id: &str) -> Result<()> {
        if project_id.trim().is_empty() {
            let err = WorkflowError::Validation("Project ID cannot be empty".to_string());
            self.record(&err);
            return Err(err);
        }

        self.state.selected_project_id = Some(project_id.to_string());
        self.enter(WorkflowStep::Setup);
        Ok(())
    }

    /// Setup catalog finished; move on to upload.
    pub fn complete_setup(&mut self) -> Result<()> {
        self.require(WorkflowStep::Setup, "complete setup")?;
        self.enter(WorkflowStep::Upload);
        Ok(())
    }

    /// Upload catalog finished; show the dashboard.
    pub fn complete_upload(&mut self) -> Result<()> {
        self.require(WorkflowStep::Upload, "complete upload")?;
        self.enter(WorkflowStep::Dashboard);
        Ok(())
    }

    /// Return to the project manager from any step.
    pub fn reset(&mut self) {
        tracing::info!(from = %self.state.step, "Workflow reset");
        self.state = WorkflowState::default();
    }

    /// Set or clear the error shown to the user.
    pub fn set_error(&mut self, message: Option<String>) {
        self.state.last_error = message;
    }

    /// Record a user-facing error for display. Internal errors are only logged.
    pub fn record(&mut self, err: &WorkflowError) {
        if err.is_user_facing() {
            self.state.last_error = Some(err.to_string());
        } else {
            tracing::error!(error = %err, "Internal workflow error");
        }
    }

    fn require(&self, expected: WorkflowStep, action: &str) -> Result<()> {
        if self.state.step == expected {
            return Ok(());
        }

        let err = WorkflowError::State(format!("cannot {} from {}", action, self.state.step));
        tracing::error!(error = %err, "Rejected workflow transition");
        if cfg!(debug_assertions) {
            panic!("{}", err);
        }
        Err(err)
    }

    fn enter(&mut self, step: WorkflowStep) {
        tracing::info!(
            from = %self.state.step,
            to = %step,
            project = self.state.selected_project_id.as_deref().unwrap_or(""),
            "Workflow transition"
        );
        self.state.step = step;
        self.state.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Select,
        CompleteSetup,
        CompleteUpload,
        Reset,
    }

    const OPS: [Op; 4] = [Op::Select, Op::CompleteSetup, Op::CompleteUpload, Op::Reset];

    fn apply_if_valid(ctrl: &mut WorkflowController, op: Op) {
        match (op, ctrl.step()) {
            (Op::Select, _) => ctrl.select_project("demo").unwrap(),
            (Op::CompleteSetup, WorkflowStep::Setup) => ctrl.complete_setup().unwrap(),
            (Op::CompleteUpload, WorkflowStep::Upload) => ctrl.complete_upload().unwrap(),
            (Op::Reset, _) => ctrl.reset(),
            _ => {}
        }
    }

    fn assert_invariant(state: &WorkflowState) {
        assert_eq!(
            state.selected_project_id().is_some(),
            state.step() != WorkflowStep::ProjectManager,
            "{state:?}"
        );
    }

    #[test]
    fn test_initial_state() {
        let ctrl = WorkflowController::new();

        assert_eq!(ctrl.state(), &WorkflowState::default());
        assert_eq!(ctrl.step(), WorkflowStep::ProjectManager);
    }

    #[test]
    fn test_full_progression() {
        let mut ctrl = WorkflowController::new();

        ctrl.select_project("demo").unwrap();
        assert_eq!(ctrl.step(), WorkflowStep::Setup);
        assert_eq!(ctrl.state().selected_project_id(), Some("demo"));

        ctrl.complete_setup().unwrap();
        assert_eq!(ctrl.step(), WorkflowStep::Upload);

        ctrl.complete_upload().unwrap();
        assert_eq!(ctrl.step(), WorkflowStep::Dashboard);
        assert_eq!(ctrl.state().selected_project_id(), Some("demo"));
    }

    #[test]
    fn test_selection_invariant_over_sequences() {
        // Every sequence of four operations, applying only the valid ones.
        for n in 0..OPS.len().pow(4) {
            let mut ctrl = WorkflowController::new();
            let mut code = n;
            for _ in 0..4 {
                apply_if_valid(&mut ctrl, OPS[code % OPS.len()]);
                code /= OPS.len();
                assert_invariant(ctrl.state());
            }
        }
    }

    #[test]
    fn test_reset_from_every_step() {
        let paths: [&[Op]; 4] = [
            &[],
            &[Op::Select],
            &[Op::Select, Op::CompleteSetup],
            &[Op::Select, Op::CompleteSetup, Op::CompleteUpload],
        ];

        for path in paths {
            let mut ctrl = WorkflowController::new();
            for op in path {
                apply_if_valid(&mut ctrl, *op);
            }
            ctrl.set_error(Some("boom".to_string()));

            ctrl.reset();

            assert_eq!(ctrl.step(), WorkflowStep::ProjectManager);
            assert_eq!(ctrl.state().selected_project_id(), None);
            assert_eq!(ctrl.state().last_error(), None);
        }
    }

    #[test]
    fn test_empty_project_id_rejected() {
        let mut ctrl = WorkflowController::new();

        let err = ctrl.select_project("  ").unwrap_err();

        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(ctrl.step(), WorkflowStep::ProjectManager);
        assert_eq!(ctrl.state().last_error(), Some("Project ID cannot be empty"));
    }

    #[test]
    fn test_error_cleared_on_transition() {
        let mut ctrl = WorkflowController::new();
        ctrl.select_project("demo").unwrap();
        ctrl.set_error(Some("Step 0 failed".to_string()));

        ctrl.complete_setup().unwrap();

        assert_eq!(ctrl.state().last_error(), None);
    }

    #[test]
    fn test_record_skips_internal_errors() {
        let mut ctrl = WorkflowController::new();

        ctrl.record(&WorkflowError::State("bad".to_string()));
        assert_eq!(ctrl.state().last_error(), None);

        ctrl.record(&WorkflowError::NotFound("missing".to_string()));
        assert_eq!(ctrl.state().last_error(), Some("Project not found: missing"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "cannot complete upload from setup")]
    fn test_out_of_order_transition_panics_in_debug() {
        let mut ctrl = WorkflowController::new();
        ctrl.select_project("demo").unwrap();

        let _ = ctrl.complete_upload();
    }

    #[test]
    fn test_step_display() {
        assert_eq!(WorkflowStep::ProjectManager.to_string(), "projectManager");
        assert_eq!(WorkflowStep::Dashboard.to_string(), "dashboard");
    }
}
