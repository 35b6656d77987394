//! Contracts for the remote services the wizard drives.
//!
//! Transport is up to the implementor; the runner only needs these calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Fallback message when a remote failure carries no detail.
pub const GENERIC_FAILURE: &str = "Remote operation failed";

/// Successful reply from a remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteReply {
    /// Human-readable status (e.g., "Git repository initialized.")
    pub message: String,
}

impl RemoteReply {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure reported by a remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct RemoteError {
    /// Failure detail from the remote side, if any
    pub detail: Option<String>,
}

impl RemoteError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// A failure without detail.
    pub fn generic() -> Self {
        Self { detail: None }
    }

    /// The detail, or the generic message when there is none.
    pub fn message(&self) -> &str {
        self.detail
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(GENERIC_FAILURE)
    }
}

/// Executes one named remote operation for a project.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn invoke(&self, endpoint: &str, project_id: &str) -> Result<RemoteReply, RemoteError>;
}

/// Lists the input files still to be uploaded for a project.
#[async_trait]
pub trait FileListing: Send + Sync {
    async fn list_pending_files(&self, project_id: &str) -> Result<Vec<String>, RemoteError>;
}

/// Triggers aggregation of uploaded inputs.
///
/// The upload catalog already ends with an aggregation step; this contract
/// exists for callers that need to aggregate outside a catalog run.
#[async_trait]
pub trait AggregationTrigger: Send + Sync {
    async fn aggregate(&self, project_id: &str) -> Result<(), RemoteError>;
}

/// Aggregation through an executor's aggregation endpoint.
pub struct EndpointAggregation {
    executor: Arc<dyn RemoteExecutor>,
    endpoint: String,
}

impl EndpointAggregation {
    pub fn new(executor: Arc<dyn RemoteExecutor>, endpoint: &str) -> Self {
        Self {
            executor,
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl AggregationTrigger for EndpointAggregation {
    async fn aggregate(&self, project_id: &str) -> Result<(), RemoteError> {
        self.executor.invoke(&self.endpoint, project_id).await.map(|_| ())
    }
}
