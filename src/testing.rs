//! Scripted collaborators for unit tests.

use crate::remote::{FileListing, RemoteError, RemoteExecutor, RemoteReply};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Executor that records every call and fails or hangs on request.
#[derive(Default)]
pub struct ScriptedExecutor {
    calls: Mutex<Vec<(String, String)>>,
    failures: Mutex<HashMap<String, Vec<RemoteError>>>,
    hanging: Mutex<HashSet<String>>,
    cancel_on: Mutex<Option<(String, CancellationToken)>>,
    files: Mutex<Option<Vec<String>>>,
}

impl ScriptedExecutor {
    /// Executor whose listing service reports no pending files.
    pub fn new() -> Self {
        let executor = Self::default();
        executor.set_files(Some(Vec::new()));
        executor
    }

    /// Fail the next call to `endpoint` with `error`. Queued failures are
    /// consumed in order.
    pub fn fail_once(&self, endpoint: &str, error: RemoteError) {
        self.failures
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .push(error);
    }

    /// Never answer calls to `endpoint`.
    pub fn hang(&self, endpoint: &str) {
        self.hanging.lock().unwrap().insert(endpoint.to_string());
    }

    /// Cancel `token` while a call to `endpoint` is in flight.
    pub fn cancel_during(&self, endpoint: &str, token: CancellationToken) {
        *self.cancel_on.lock().unwrap() = Some((endpoint.to_string(), token));
    }

    /// Files returned by the listing service; `None` makes listing fail.
    pub fn set_files(&self, files: Option<Vec<&str>>) {
        *self.files.lock().unwrap() =
            files.map(|f| f.into_iter().map(String::from).collect());
    }

    /// Endpoints invoked so far, in order.
    pub fn endpoints(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(endpoint, _)| endpoint.clone())
            .collect()
    }

    /// Project ids passed with each call.
    pub fn projects(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, project)| project.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteExecutor for ScriptedExecutor {
    async fn invoke(&self, endpoint: &str, project_id: &str) -> Result<RemoteReply, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), project_id.to_string()));

        let cancel = self.cancel_on.lock().unwrap().clone();
        if let Some((target, token)) = cancel {
            if target == endpoint {
                token.cancel();
            }
        }

        let hangs = self.hanging.lock().unwrap().contains(endpoint);
        if hangs {
            std::future::pending::<()>().await;
        }

        let failure = {
            let mut failures = self.failures.lock().unwrap();
            match failures.get_mut(endpoint) {
                Some(queue) if !queue.is_empty() => Some(queue.remove(0)),
                _ => None,
            }
        };

        match failure {
            Some(error) => Err(error),
            None => Ok(RemoteReply::new(format!("{} done", endpoint))),
        }
    }
}

#[async_trait]
impl FileListing for ScriptedExecutor {
    async fn list_pending_files(&self, _project_id: &str) -> Result<Vec<String>, RemoteError> {
        self.files
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RemoteError::new("listing unavailable"))
    }
}
