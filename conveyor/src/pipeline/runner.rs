//! Sequential, fail-fast pipeline execution.

use super::{StageRegistry, StageSpec};
use crate::cancellation::CancellationToken;
use crate::context::RunContext;
use crate::core::{RunReport, StageResult, StageStatus};
use crate::errors::{PipelineError, RunInProgressError};
use crate::events::{EventSink, NoOpEventSink};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default per-stage wall-clock timeout.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

type PostRunHook = Box<dyn Fn(&RunReport) + Send + Sync>;

/// Executes a registered stage sequence against a run context.
///
/// Stages run strictly sequentially, never concurrently. The loop halts at
/// the first failure unless the failing stage is marked
/// `continue_on_failure`; a false condition records a skip and moves on; a
/// set cancellation token stops the loop before the next stage starts. At
/// most one run per runner instance is in flight at a time.
pub struct PipelineRunner {
    name: String,
    registry: StageRegistry,
    default_timeout: Duration,
    sink: Arc<dyn EventSink>,
    token: Arc<CancellationToken>,
    post_run: Option<PostRunHook>,
    running: AtomicBool,
}

impl PipelineRunner {
    /// Creates a runner over a registered stage sequence.
    #[must_use]
    pub fn new(name: impl Into<String>, registry: StageRegistry) -> Self {
        Self {
            name: name.into(),
            registry,
            default_timeout: DEFAULT_STAGE_TIMEOUT,
            sink: Arc::new(NoOpEventSink),
            token: Arc::new(CancellationToken::new()),
            post_run: None,
            running: AtomicBool::new(false),
        }
    }

    /// Sets the default per-stage timeout. Individual stages may override it.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets the event sink receiving run/stage lifecycle events.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the cancellation token the loop checks between stages.
    #[must_use]
    pub fn with_cancellation(mut self, token: Arc<CancellationToken>) -> Self {
        self.token = token;
        self
    }

    /// Registers an unconditional post-run hook, invoked with the finished
    /// report whatever the outcome. The always-runs archiving step belongs
    /// here, outside the stage list.
    #[must_use]
    pub fn with_post_run<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RunReport) + Send + Sync + 'static,
    {
        self.post_run = Some(Box::new(hook));
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of registered stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns the cancellation token, for wiring to an external signal.
    #[must_use]
    pub fn cancellation_token(&self) -> Arc<CancellationToken> {
        Arc::clone(&self.token)
    }

    /// Executes the full stage sequence and returns the aggregated report.
    ///
    /// # Errors
    ///
    /// Returns `RunInProgressError` if another run is in flight on this
    /// runner. Stage failures are not errors: they are recorded in the
    /// report.
    pub async fn run(&self, ctx: RunContext) -> Result<RunReport, PipelineError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RunInProgressError::new(&self.name).into());
        }

        let report = self.run_inner(ctx).await;
        self.running.store(false, Ordering::SeqCst);

        if let Some(hook) = &self.post_run {
            hook(&report);
        }

        Ok(report)
    }

    async fn run_inner(&self, ctx: RunContext) -> RunReport {
        let run_start = Instant::now();
        let mut results = Vec::with_capacity(self.registry.len());

        self.sink.try_emit(
            "run.started",
            Some(serde_json::json!({
                "pipeline": self.name,
                "run_id": ctx.identity.run_id,
                "branch": ctx.branch,
                "stages": self.registry.len(),
            })),
        );

        for spec in self.registry.stages() {
            if self.token.is_cancelled() {
                let reason = self
                    .token
                    .reason()
                    .unwrap_or_else(|| "cancelled".to_string());

                self.sink.try_emit(
                    "run.cancelled",
                    Some(serde_json::json!({
                        "pipeline": self.name,
                        "next_stage": spec.name,
                        "reason": reason,
                    })),
                );

                results.push(StageResult::cancelled(&spec.name, Utc::now(), reason));
                break;
            }

            if let Some(condition) = &spec.condition {
                if !condition.evaluate(&ctx) {
                    self.sink.try_emit(
                        "stage.skipped",
                        Some(serde_json::json!({
                            "stage": spec.name,
                            "condition": condition.description(),
                        })),
                    );

                    results.push(StageResult::skipped(&spec.name, Utc::now()));
                    continue;
                }
            }

            let result = self.execute_stage(spec, &ctx).await;

            let halt = result.is_failed() && !spec.continue_on_failure;
            results.push(result);
            if halt {
                break;
            }
        }

        let report = RunReport::new(
            &self.name,
            ctx,
            results,
            run_start.elapsed().as_secs_f64() * 1000.0,
        );

        self.sink.try_emit(
            "run.finished",
            Some(serde_json::json!({
                "pipeline": self.name,
                "overall": report.overall,
                "duration_ms": report.duration_ms,
            })),
        );

        report
    }

    async fn execute_stage(&self, spec: &StageSpec, ctx: &RunContext) -> StageResult {
        self.sink.try_emit(
            "stage.started",
            Some(serde_json::json!({ "stage": spec.name })),
        );

        let started_at = Utc::now();
        let stage_start = Instant::now();
        let timeout = spec.timeout.unwrap_or(self.default_timeout);

        // The action runs in its own task so a panicking action still yields
        // a well-formed result instead of unwinding through the loop. A
        // timed-out action is abandoned, not killed; interrupting in-flight
        // work is its collaborator's job.
        let outcome = {
            let action = Arc::clone(&spec.action);
            let ctx = ctx.clone();
            let task = tokio::spawn(async move { action.invoke(&ctx).await });
            tokio::time::timeout(timeout, task).await
        };
        let duration_ms = stage_start.elapsed().as_secs_f64() * 1000.0;

        let result = match outcome {
            Err(_elapsed) => StageResult::timed_out(&spec.name, started_at, duration_ms),
            Ok(Err(join_error)) => StageResult::errored(
                &spec.name,
                started_at,
                duration_ms,
                format!("action crashed: {join_error}"),
            ),
            Ok(Ok(Ok(0))) => StageResult::passed(&spec.name, started_at, duration_ms),
            Ok(Ok(Ok(exit_code))) => {
                StageResult::failed(&spec.name, started_at, duration_ms, exit_code)
            }
            Ok(Ok(Err(error))) => {
                StageResult::errored(&spec.name, started_at, duration_ms, error.to_string())
            }
        };

        match result.status {
            StageStatus::Passed => self.sink.try_emit(
                "stage.completed",
                Some(serde_json::json!({
                    "stage": spec.name,
                    "duration_ms": result.duration_ms,
                })),
            ),
            StageStatus::Failed => self.sink.try_emit(
                "stage.failed",
                Some(serde_json::json!({
                    "stage": spec.name,
                    "exit_code": result.exit_code,
                    "reason": result.reason,
                    "duration_ms": result.duration_ms,
                })),
            ),
            StageStatus::Skipped => {}
        }

        result
    }
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("name", &self.name)
            .field("stages", &self.registry.names())
            .field("default_timeout", &self.default_timeout)
            .field("running", &self.running.load(Ordering::SeqCst))
            .finish()
    }
}
