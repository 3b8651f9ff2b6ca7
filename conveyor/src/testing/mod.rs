//! Test support: recording actions and context fixtures.

use crate::context::RunContext;
use crate::stages::StageAction;
use crate::version::Version;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Returns a context fixture for tests: version 0.1.0, commit `a11dfd9`,
/// branch `main`.
#[must_use]
pub fn test_context() -> RunContext {
    RunContext::new(Version::new(0, 1, 0), "a11dfd9", "main")
}

/// An action that records invocations and returns scripted exit codes.
///
/// Each invocation pops the next scripted code; when the script runs dry the
/// action exits 0.
#[derive(Debug, Default)]
pub struct RecordingAction {
    exit_codes: Mutex<VecDeque<i32>>,
    calls: AtomicUsize,
}

impl RecordingAction {
    /// Creates an action that always exits 0.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Creates an action that exits with the given code once, then 0.
    #[must_use]
    pub fn failing(exit_code: i32) -> Self {
        Self::scripted([exit_code])
    }

    /// Creates an action with a script of exit codes.
    #[must_use]
    pub fn scripted(exit_codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            exit_codes: Mutex::new(exit_codes.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the number of times the action was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StageAction for RecordingAction {
    async fn invoke(&self, _ctx: &RunContext) -> Result<i32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.exit_codes.lock().pop_front().unwrap_or(0))
    }
}

/// An action that sleeps before exiting 0, for timeout and concurrency
/// tests.
#[derive(Debug)]
pub struct SlowAction {
    delay: Duration,
}

impl SlowAction {
    /// Creates an action sleeping for the given duration.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl StageAction for SlowAction {
    async fn invoke(&self, _ctx: &RunContext) -> Result<i32> {
        tokio::time::sleep(self.delay).await;
        Ok(0)
    }
}
