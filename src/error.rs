//! Error taxonomy for the wizard workflow.

use thiserror::Error;

/// Errors surfaced by the workflow controller, the step runner and the
/// project registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// User-correctable input problem (empty or malformed project id).
    #[error("{0}")]
    Validation(String),

    /// A project with this id already exists.
    #[error("Project already exists: {0}")]
    Conflict(String),

    /// The project does not exist.
    #[error("Project not found: {0}")]
    NotFound(String),

    /// A catalog step failed. Retryable.
    #[error("Step {index} ({title}) failed: {detail}")]
    RemoteOperation {
        /// 0-based position of the step in its catalog
        index: usize,
        /// Display label of the step
        title: String,
        /// Failure detail reported for the step
        detail: String,
    },

    /// An operation was attempted from a state that does not allow it.
    #[error("Invalid state: {0}")]
    State(String),

    /// Invalid wizard configuration or catalog definition.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl WorkflowError {
    /// Whether the user can fix this by changing input or retrying.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, WorkflowError::State(_))
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_operation_display() {
        let err = WorkflowError::RemoteOperation {
            index: 1,
            title: "Create .gitignore".to_string(),
            detail: "permission denied".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Step 1 (Create .gitignore) failed: permission denied"
        );
    }

    #[test]
    fn test_state_errors_are_internal() {
        assert!(!WorkflowError::State("bad".into()).is_user_facing());
        assert!(WorkflowError::Conflict("demo".into()).is_user_facing());
    }
}
