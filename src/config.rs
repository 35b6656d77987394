//! Wizard configuration.

use crate::catalog::Catalog;
use crate::runner::RunnerConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_step_timeout_ms() -> u64 {
    30_000
}

fn default_upload_endpoint() -> String {
    "/api/user_inputs/upload/{{ file }}".to_string()
}

fn default_aggregate_endpoint() -> String {
    "/api/user_inputs/aggregate_wbs".to_string()
}

fn default_aggregate_title() -> String {
    "Aggregate WBS".to_string()
}

/// Top-level wizard configuration, usually loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Per-step timeout in milliseconds; 0 disables it
    #[serde(default = "default_step_timeout_ms")]
    pub step_timeout_ms: u64,

    /// Pause after each successful step, for display pacing
    #[serde(default)]
    pub settle_delay_ms: u64,

    /// Setup catalog
    #[serde(default = "Catalog::default_setup")]
    pub setup: Catalog,

    /// Upload endpoints
    #[serde(default)]
    pub upload: UploadConfig,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            step_timeout_ms: default_step_timeout_ms(),
            settle_delay_ms: 0,
            setup: Catalog::default_setup(),
            upload: UploadConfig::default(),
        }
    }
}

impl WizardConfig {
    /// Runner settings derived from this configuration.
    pub fn runner(&self) -> RunnerConfig {
        RunnerConfig {
            step_timeout: (self.step_timeout_ms > 0)
                .then(|| Duration::from_millis(self.step_timeout_ms)),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

/// Endpoints used to build the upload catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Upload endpoint template, rendered with `file` and `project_id`
    #[serde(default = "default_upload_endpoint")]
    pub endpoint: String,

    /// Endpoint of the final aggregation step
    #[serde(default = "default_aggregate_endpoint")]
    pub aggregate_endpoint: String,

    /// Label of the final aggregation step
    #[serde(default = "default_aggregate_title")]
    pub aggregate_title: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: default_upload_endpoint(),
            aggregate_endpoint: default_aggregate_endpoint(),
            aggregate_title: default_aggregate_title(),
        }
    }
}
