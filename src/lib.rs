//! # pm-wizard
//!
//! Setup and upload wizard for the project-management dashboard.
//!
//! A [`WorkflowController`] walks a project through
//! `projectManager → setup → upload → dashboard`. The setup and upload
//! phases each run a [`Catalog`] of remote operations through a
//! [`StepRunner`], one step at a time, with retry of the failed step.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pm_wizard::{InMemoryRegistry, Wizard, WizardConfig};
//! # use pm_wizard::remote::{FileListing, RemoteError, RemoteExecutor, RemoteReply};
//! # use std::sync::Arc;
//! # struct Backend;
//! # #[async_trait::async_trait]
//! # impl RemoteExecutor for Backend {
//! #     async fn invoke(&self, _: &str, _: &str) -> Result<RemoteReply, RemoteError> {
//! #         Ok(RemoteReply::new("ok"))
//! #     }
//! # }
//! # #[async_trait::async_trait]
//! # impl FileListing for Backend {
//! #     async fn list_pending_files(&self, _: &str) -> Result<Vec<String>, RemoteError> {
//! #         Ok(Vec::new())
//! #     }
//! # }
//! # async fn demo() -> Result<(), pm_wizard::WorkflowError> {
//! let backend = Arc::new(Backend);
//! let mut wizard = Wizard::new(
//!     WizardConfig::default(),
//!     Arc::new(InMemoryRegistry::new()),
//!     backend.clone(),
//!     backend,
//! );
//!
//! wizard.create_project("demo").await?;
//! wizard.select_project("demo").await?;
//! wizard.run_setup().await?;
//! wizard.run_upload().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## YAML Configuration
//!
//! ```yaml
//! step_timeout_ms: 30000
//! setup:
//!   name: setup
//!   steps:
//!     - title: Initialize Git Repository
//!       endpoint: /setup/init_git
//! upload:
//!   endpoint: "/api/user_inputs/upload/{{ file }}"
//!   aggregate_endpoint: /api/user_inputs/aggregate_wbs
//! ```

mod catalog;
mod config;
mod context;
mod controller;
mod error;
pub mod registry;
pub mod remote;
mod runner;
pub mod server;
mod step;
mod wizard;
pub mod yaml;

#[cfg(test)]
mod testing;

pub use catalog::{Catalog, CatalogBuilder};
pub use config::{UploadConfig, WizardConfig};
pub use context::RunContext;
pub use controller::{WorkflowController, WorkflowState, WorkflowStep};
pub use error::{Result, WorkflowError};
pub use registry::{InMemoryRegistry, Project, ProjectRegistry};
pub use runner::{RunOutcome, RunPhase, RunState, RunnerConfig, StepResult, StepRunner};
pub use step::{StepBuilder, StepDescriptor};
pub use wizard::Wizard;
pub use yaml::{parse_catalog, parse_config};
