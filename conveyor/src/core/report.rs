//! Run report aggregation and rendering.

use super::{RunStatus, StageResult, StageStatus};
use crate::context::RunContext;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// The aggregated outcome of a pipeline run.
///
/// Built incrementally during execution, immutable once the run ends. The
/// result sequence is a prefix of the registered stage list: stages after a
/// fail-fast halt are absent, not skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// The pipeline name.
    pub pipeline: String,
    /// The context the run executed against.
    pub context: RunContext,
    /// Per-stage results in execution order.
    pub results: Vec<StageResult>,
    /// Overall run status. Failed iff any stage result is Failed.
    pub overall: RunStatus,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: f64,
}

impl RunReport {
    /// Creates a report from the recorded results, computing the overall
    /// status from the sequence.
    #[must_use]
    pub fn new(
        pipeline: impl Into<String>,
        context: RunContext,
        results: Vec<StageResult>,
        duration_ms: f64,
    ) -> Self {
        let overall = if results.iter().any(StageResult::is_failed) {
            RunStatus::Failed
        } else {
            RunStatus::Success
        };

        Self {
            pipeline: pipeline.into(),
            context,
            results,
            overall,
            duration_ms,
        }
    }

    /// Returns the result for a named stage, if it was attempted.
    #[must_use]
    pub fn result(&self, stage_name: &str) -> Option<&StageResult> {
        self.results.iter().find(|r| r.stage_name == stage_name)
    }

    /// Returns the first failed result, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<&StageResult> {
        self.results.iter().find(|r| r.is_failed())
    }

    /// Counts results per status. Computable from the result sequence alone.
    #[must_use]
    pub fn summarize(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: self.results.len(),
            passed: 0,
            failed: 0,
            skipped: 0,
            overall: self.overall,
        };

        for result in &self.results {
            match result.status {
                StageStatus::Passed => summary.passed += 1,
                StageStatus::Failed => summary.failed += 1,
                StageStatus::Skipped => summary.skipped += 1,
            }
        }

        summary
    }

    /// Renders the report as a human-readable stage-by-stage log.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "pipeline '{}' (version {}, commit {}, branch {})",
            self.pipeline, self.context.version, self.context.commit, self.context.branch
        );

        for result in &self.results {
            let mark = match result.status {
                StageStatus::Passed => '\u{2713}',
                StageStatus::Failed => '\u{2717}',
                StageStatus::Skipped => '-',
            };
            let _ = write!(
                out,
                "  {mark} {:<12} {:<8}",
                result.stage_name,
                result.status.to_string()
            );
            match result.status {
                StageStatus::Skipped => {}
                _ => {
                    let _ = write!(out, " {:>10.1}ms", result.duration_ms);
                }
            }
            if let Some(code) = result.exit_code.filter(|c| *c != 0) {
                let _ = write!(out, "  exit {code}");
            }
            if let Some(reason) = &result.reason {
                let _ = write!(out, "  ({reason})");
            }
            out.push('\n');
        }

        let summary = self.summarize();
        let _ = writeln!(
            out,
            "overall: {} ({} passed, {} failed, {} skipped) in {:.1}ms",
            self.overall, summary.passed, summary.failed, summary.skipped, self.duration_ms
        );

        out
    }

    /// Serializes the report as pretty-printed JSON for external consumers.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Per-status counts plus the overall outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of attempted stages (including skips).
    pub total: usize,
    /// Number of passed stages.
    pub passed: usize,
    /// Number of failed stages.
    pub failed: usize,
    /// Number of skipped stages.
    pub skipped: usize,
    /// Overall run status.
    pub overall: RunStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;
    use chrono::Utc;

    fn test_context() -> RunContext {
        RunContext::new(Version::new(0, 1, 0), "a11dfd9", "main")
    }

    #[test]
    fn test_overall_success_with_no_failures() {
        let results = vec![
            StageResult::passed("lint", Utc::now(), 10.0),
            StageResult::skipped("publish", Utc::now()),
        ];
        let report = RunReport::new("demo", test_context(), results, 12.0);

        assert_eq!(report.overall, RunStatus::Success);
    }

    #[test]
    fn test_overall_failed_iff_any_failure() {
        let results = vec![
            StageResult::passed("lint", Utc::now(), 10.0),
            StageResult::failed("test", Utc::now(), 20.0, 1),
        ];
        let report = RunReport::new("demo", test_context(), results, 30.0);

        assert_eq!(report.overall, RunStatus::Failed);
        assert_eq!(report.first_failure().unwrap().stage_name, "test");
    }

    #[test]
    fn test_empty_run_is_success() {
        let report = RunReport::new("demo", test_context(), Vec::new(), 0.0);
        assert_eq!(report.overall, RunStatus::Success);
    }

    #[test]
    fn test_summarize_counts() {
        let results = vec![
            StageResult::passed("lint", Utc::now(), 10.0),
            StageResult::passed("test", Utc::now(), 10.0),
            StageResult::failed("build", Utc::now(), 10.0, 1),
            StageResult::skipped("publish", Utc::now()),
        ];
        let report = RunReport::new("demo", test_context(), results, 30.0);
        let summary = report.summarize();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.overall, RunStatus::Failed);
    }

    #[test]
    fn test_result_lookup_by_name() {
        let results = vec![StageResult::passed("lint", Utc::now(), 10.0)];
        let report = RunReport::new("demo", test_context(), results, 10.0);

        assert!(report.result("lint").is_some());
        assert!(report.result("docker").is_none());
    }

    #[test]
    fn test_render_text_lists_every_stage() {
        let results = vec![
            StageResult::passed("lint", Utc::now(), 10.0),
            StageResult::failed("test", Utc::now(), 20.0, 1),
            StageResult::skipped("publish", Utc::now()),
        ];
        let report = RunReport::new("demo", test_context(), results, 30.0);
        let text = report.render_text();

        assert!(text.contains("lint"));
        assert!(text.contains("exit 1"));
        assert!(text.contains("skipped"));
        assert!(text.contains("overall: failed"));
    }

    #[test]
    fn test_report_json_round_trip() {
        let results = vec![
            StageResult::passed("lint", Utc::now(), 10.0),
            StageResult::failed("test", Utc::now(), 20.0, 1),
        ];
        let report = RunReport::new("demo", test_context(), results, 30.0);

        let json = report.to_json().unwrap();
        let deserialized: RunReport = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.pipeline, "demo");
        assert_eq!(deserialized.overall, RunStatus::Failed);
        assert_eq!(deserialized.results.len(), 2);
        assert_eq!(deserialized.summarize(), report.summarize());
    }
}
