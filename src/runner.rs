//! Step runner: executes a catalog one step at a time.

use crate::catalog::Catalog;
use crate::context::RunContext;
use crate::error::{Result, WorkflowError};
use crate::remote::{RemoteExecutor, RemoteReply};
use crate::step::StepDescriptor;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Runner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Maximum time a single step may take; `None` waits forever
    pub step_timeout: Option<Duration>,

    /// Pause after each successful step
    pub settle_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_timeout: Some(Duration::from_secs(30)),
            settle_delay: Duration::ZERO,
        }
    }
}

/// Where a catalog run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "index", rename_all = "camelCase")]
pub enum RunPhase {
    Idle,
    Running(usize),
    Failed(usize),
    Completed,
    Cancelled,
}

/// Observable state of the current run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub phase: RunPhase,
    pub current_index: usize,
    /// Last status line ("Running: ..." or the step's reply message)
    pub status: String,
    pub error: Option<String>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            phase: RunPhase::Idle,
            current_index: 0,
            status: String::new(),
            error: None,
        }
    }
}

/// How a call to [`StepRunner::run`] or [`StepRunner::retry`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step succeeded. `invocations` counts remote calls in this run,
    /// retries included.
    Completed { invocations: usize },

    /// The step at `index` failed; call `retry` to re-invoke it.
    Failed { index: usize, error: String },

    /// The run was abandoned.
    Cancelled,
}

/// Result of a single step execution.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Step index (0-based)
    pub index: usize,

    /// Step that was executed
    pub step: StepDescriptor,

    /// Status message returned by the remote operation
    pub message: String,

    /// Execution time in milliseconds
    pub duration_ms: f64,
}

/// Runs catalogs sequentially against a [`RemoteExecutor`].
///
/// At most one remote call is outstanding at any time. Cancellation is
/// cooperative: it stops further steps from starting, and a reply that
/// arrives after cancellation is discarded.
pub struct StepRunner {
    executor: Arc<dyn RemoteExecutor>,
    config: RunnerConfig,
    catalog: Catalog,
    project_id: String,
    ctx: RunContext,
    state: RunState,
    cancel: CancellationToken,
    updates: watch::Sender<RunState>,
    invocations: usize,
    step_results: Vec<StepResult>,
}

impl StepRunner {
    pub fn new(executor: Arc<dyn RemoteExecutor>, config: RunnerConfig) -> Self {
        let (updates, _) = watch::channel(RunState::default());
        Self {
            executor,
            config,
            catalog: Catalog::empty("none"),
            project_id: String::new(),
            ctx: RunContext::new(),
            state: RunState::default(),
            cancel: CancellationToken::new(),
            updates,
            invocations: 0,
            step_results: Vec::new(),
        }
    }

    /// Prepare a new run, discarding any previous one.
    pub fn load(&mut self, catalog: Catalog, project_id: &str) {
        tracing::debug!(
            catalog = %catalog.name,
            steps = catalog.len(),
            project = %project_id,
            "Loading catalog"
        );

        self.catalog = catalog;
        self.project_id = project_id.to_string();
        self.ctx = RunContext::for_project(project_id);
        self.cancel = CancellationToken::new();
        self.invocations = 0;
        self.step_results.clear();
        self.state = RunState::default();
        self.publish();
    }

    /// Run the loaded catalog from its first step.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        if self.state.phase != RunPhase::Idle {
            return Err(WorkflowError::State(format!(
                "cannot run catalog '{}' from {:?}",
                self.catalog.name, self.state.phase
            )));
        }
        self.drive(0).await
    }

    /// Re-invoke the failed step and continue from there.
    pub async fn retry(&mut self) -> Result<RunOutcome> {
        match self.state.phase {
            RunPhase::Failed(index) => {
                tracing::info!(catalog = %self.catalog.name, step = index, "Retrying step");
                self.drive(index).await
            }
            phase => Err(WorkflowError::State(format!(
                "cannot retry catalog '{}' from {:?}",
                self.catalog.name, phase
            ))),
        }
    }

    /// Abandon the run. Steps already executed are not rolled back.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if !matches!(self.state.phase, RunPhase::Completed | RunPhase::Cancelled) {
            tracing::warn!(catalog = %self.catalog.name, "Run cancelled");
            self.state.phase = RunPhase::Cancelled;
            self.publish();
        }
    }

    /// Token that cancels the current run from another task.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Watch run state changes.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.updates.subscribe()
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn step_results(&self) -> &[StepResult] {
        &self.step_results
    }

    async fn drive(&mut self, start: usize) -> Result<RunOutcome> {
        let total = self.catalog.len();
        let run_start = Instant::now();

        tracing::info!(
            catalog = %self.catalog.name,
            steps = total,
            start = start,
            project = %self.project_id,
            "Starting catalog run"
        );

        let mut index = start;
        while index < total {
            if self.cancel.is_cancelled() {
                return Ok(self.cancelled(index));
            }

            let step = self.catalog.steps[index].clone();
            self.state.phase = RunPhase::Running(index);
            self.state.current_index = index;
            self.state.status = format!("Running: {}...", step.title);
            self.state.error = None;
            self.publish();

            let step_start = Instant::now();
            let result = self.invoke(index, &step).await;

            if self.cancel.is_cancelled() {
                tracing::debug!(step = index, "Ignoring result of cancelled run");
                return Ok(self.cancelled(index));
            }

            match result {
                Ok(reply) => {
                    let step_ms = step_start.elapsed().as_secs_f64() * 1000.0;
                    tracing::debug!(step = index, duration_ms = step_ms, "Step completed");

                    self.ctx.push_status(reply.message.clone());
                    self.state.status = reply.message.clone();
                    self.publish();
                    self.step_results.push(StepResult {
                        index,
                        step,
                        message: reply.message,
                        duration_ms: step_ms,
                    });

                    if !self.config.settle_delay.is_zero() {
                        tokio::time::sleep(self.config.settle_delay).await;
                    }
                    index += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        catalog = %self.catalog.name,
                        step = index,
                        title = %step.title,
                        error = %error,
                        "Step failed"
                    );

                    self.state.phase = RunPhase::Failed(index);
                    self.state.error = Some(error.clone());
                    self.publish();
                    return Ok(RunOutcome::Failed { index, error });
                }
            }
        }

        self.state.phase = RunPhase::Completed;
        self.publish();

        tracing::info!(
            catalog = %self.catalog.name,
            invocations = self.invocations,
            total_ms = run_start.elapsed().as_secs_f64() * 1000.0,
            "Catalog completed"
        );

        Ok(RunOutcome::Completed {
            invocations: self.invocations,
        })
    }

    /// Dispatch one step, mapping every failure to a display message.
    async fn invoke(
        &mut self,
        index: usize,
        step: &StepDescriptor,
    ) -> std::result::Result<RemoteReply, String> {
        self.ctx.set("step_index", Value::from(index));
        self.ctx.set("step_id", Value::from(step.id));

        let endpoint = if step.is_templated() {
            self.ctx.render(&step.endpoint).map_err(|e| format!("{:#}", e))?
        } else {
            step.endpoint.clone()
        };

        tracing::debug!(
            step = index,
            endpoint = %endpoint,
            project = %self.project_id,
            "Executing step"
        );

        self.invocations += 1;
        let executor = Arc::clone(&self.executor);
        let call = executor.invoke(&endpoint, &self.project_id);

        let result = match self.config.step_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(format!("Step timed out after {} ms", limit.as_millis()));
                }
            },
            None => call.await,
        };

        result.map_err(|e| e.message().to_string())
    }

    fn cancelled(&mut self, index: usize) -> RunOutcome {
        tracing::warn!(catalog = %self.catalog.name, step = index, "Run cancelled");
        self.state.phase = RunPhase::Cancelled;
        self.publish();
        RunOutcome::Cancelled
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }
}
