//! Catalog step definitions.

use serde::{Deserialize, Serialize};

/// A single named remote operation in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    /// Ordinal of the step (1-based; assigned from position when omitted)
    #[serde(default)]
    pub id: usize,

    /// Label shown while the step runs (e.g., "Initialize Git Repository")
    pub title: String,

    /// Endpoint of the remote operation (may contain `{{ project_id }}`)
    pub endpoint: String,

    /// Endpoint is already final and must be dispatched verbatim
    #[serde(skip)]
    pub literal: bool,
}

impl StepDescriptor {
    /// Create a step bound to a remote endpoint.
    pub fn remote(title: &str, endpoint: &str) -> StepBuilder {
        StepBuilder::new(title, endpoint)
    }

    /// Whether the endpoint needs rendering before dispatch.
    pub fn is_templated(&self) -> bool {
        !self.literal && self.endpoint.contains("{{") && self.endpoint.contains("}}")
    }
}

/// Builder for catalog steps.
#[derive(Debug, Clone)]
pub struct StepBuilder {
    step: StepDescriptor,
}

impl StepBuilder {
    /// Create a new step builder.
    pub fn new(title: &str, endpoint: &str) -> Self {
        Self {
            step: StepDescriptor {
                id: 0,
                title: title.to_string(),
                endpoint: endpoint.to_string(),
                literal: false,
            },
        }
    }

    /// Set an explicit ordinal.
    pub fn id(mut self, id: usize) -> Self {
        self.step.id = id;
        self
    }

    /// Dispatch the endpoint as-is, without template rendering.
    pub fn literal(mut self) -> Self {
        self.step.literal = true;
        self
    }

    /// Build the step.
    pub fn build(self) -> StepDescriptor {
        self.step
    }
}

impl From<StepBuilder> for StepDescriptor {
    fn from(builder: StepBuilder) -> Self {
        builder.build()
    }
}
