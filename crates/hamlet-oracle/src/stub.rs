//! Test doubles and the offline oracle.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::OracleError;
use crate::request::{Oracle, OracleRequest, OracleTask};

/// An oracle that fails every call with [`OracleError::Unavailable`].
#[derive(Debug, Clone)]
pub struct StubOracle {
    reason: String,
}

impl StubOracle {
    /// Create a stub that reports `reason` on every call.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for StubOracle {
    fn default() -> Self {
        Self::new("stub oracle")
    }
}

impl Oracle for StubOracle {
    async fn complete(&self, _request: &OracleRequest) -> Result<String, OracleError> {
        Err(OracleError::Unavailable(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

type Script = dyn Fn(&OracleRequest) -> Result<String, OracleError> + Send + Sync;

/// An oracle whose replies come from a closure over the request.
///
/// Every call's task is recorded; clones share the script and the log.
#[derive(Clone)]
pub struct ScriptedOracle {
    script: Arc<Script>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<OracleTask>>>,
}

impl ScriptedOracle {
    /// Create an oracle answering with `script`.
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&OracleRequest) -> Result<String, OracleError> + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(script),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sleep for `delay` before answering, to exercise timeouts.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Tasks seen so far, in call order.
    pub fn calls(&self) -> Vec<OracleTask> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls made for `task`.
    pub fn count(&self, task: OracleTask) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| **t == task)
            .count()
    }
}

impl core::fmt::Debug for ScriptedOracle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScriptedOracle")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Oracle for ScriptedOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.task);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.script)(request)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
