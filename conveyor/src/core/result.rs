//! Per-stage result records.

use super::{FailureReason, StageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The recorded outcome of one attempted stage.
///
/// Appended to the run report exactly once per attempted stage. Skipped
/// stages still get a result, with no exit code; stages after a fail-fast
/// halt get none at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// The stage name.
    pub stage_name: String,
    /// The stage outcome.
    pub status: StageStatus,
    /// The exit code the action produced, if it produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Why a failed stage failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    /// Error message for actions that errored or were cancelled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the stage was attempted.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: f64,
}

impl StageResult {
    /// Creates a passed result (exit code 0).
    #[must_use]
    pub fn passed(stage_name: impl Into<String>, started_at: DateTime<Utc>, duration_ms: f64) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Passed,
            exit_code: Some(0),
            reason: None,
            error: None,
            started_at,
            duration_ms,
        }
    }

    /// Creates a failed result for a non-zero exit code.
    #[must_use]
    pub fn failed(
        stage_name: impl Into<String>,
        started_at: DateTime<Utc>,
        duration_ms: f64,
        exit_code: i32,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Failed,
            exit_code: Some(exit_code),
            reason: Some(FailureReason::NonZeroExit),
            error: None,
            started_at,
            duration_ms,
        }
    }

    /// Creates a failed result for an action that errored before producing an
    /// exit code.
    #[must_use]
    pub fn errored(
        stage_name: impl Into<String>,
        started_at: DateTime<Utc>,
        duration_ms: f64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Failed,
            exit_code: None,
            reason: Some(FailureReason::ActionError),
            error: Some(error.into()),
            started_at,
            duration_ms,
        }
    }

    /// Creates a failed result for an action that exceeded its timeout.
    #[must_use]
    pub fn timed_out(
        stage_name: impl Into<String>,
        started_at: DateTime<Utc>,
        duration_ms: f64,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Failed,
            exit_code: None,
            reason: Some(FailureReason::TimedOut),
            error: None,
            started_at,
            duration_ms,
        }
    }

    /// Creates a failed result for a stage the run was cancelled before.
    #[must_use]
    pub fn cancelled(
        stage_name: impl Into<String>,
        started_at: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Failed,
            exit_code: None,
            reason: Some(FailureReason::Cancelled),
            error: Some(reason.into()),
            started_at,
            duration_ms: 0.0,
        }
    }

    /// Creates a skipped result. The action was never invoked, so there is no
    /// exit code and no duration.
    #[must_use]
    pub fn skipped(stage_name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Skipped,
            exit_code: None,
            reason: None,
            error: None,
            started_at,
            duration_ms: 0.0,
        }
    }

    /// Returns true if the stage passed.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self.status, StageStatus::Passed)
    }

    /// Returns true if the stage failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, StageStatus::Failed)
    }

    /// Returns true if the stage was skipped.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self.status, StageStatus::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_result() {
        let result = StageResult::passed("lint", Utc::now(), 120.5);

        assert_eq!(result.stage_name, "lint");
        assert!(result.is_passed());
        assert_eq!(result.exit_code, Some(0));
        assert!(result.reason.is_none());
    }

    #[test]
    fn test_failed_result_keeps_exit_code() {
        let result = StageResult::failed("test", Utc::now(), 80.0, 2);

        assert!(result.is_failed());
        assert_eq!(result.exit_code, Some(2));
        assert_eq!(result.reason, Some(FailureReason::NonZeroExit));
    }

    #[test]
    fn test_errored_result_has_no_exit_code() {
        let result = StageResult::errored("build", Utc::now(), 5.0, "spawn failed");

        assert!(result.is_failed());
        assert!(result.exit_code.is_none());
        assert_eq!(result.reason, Some(FailureReason::ActionError));
        assert_eq!(result.error.as_deref(), Some("spawn failed"));
    }

    #[test]
    fn test_timed_out_result() {
        let result = StageResult::timed_out("docker", Utc::now(), 30_000.0);

        assert!(result.is_failed());
        assert_eq!(result.reason, Some(FailureReason::TimedOut));
    }

    #[test]
    fn test_skipped_result_has_no_exit_code() {
        let result = StageResult::skipped("publish", Utc::now());

        assert!(result.is_skipped());
        assert!(result.exit_code.is_none());
        assert!(result.reason.is_none());
        assert!((result.duration_ms - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cancelled_result() {
        let result = StageResult::cancelled("publish", Utc::now(), "interrupted by user");

        assert!(result.is_failed());
        assert_eq!(result.reason, Some(FailureReason::Cancelled));
        assert_eq!(result.error.as_deref(), Some("interrupted by user"));
    }

    #[test]
    fn test_result_serialization_omits_empty_fields() {
        let result = StageResult::skipped("publish", Utc::now());
        let json = serde_json::to_string(&result).unwrap();

        assert!(!json.contains("exit_code"));
        assert!(!json.contains("reason"));

        let deserialized: StageResult = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.stage_name, "publish");
        assert_eq!(deserialized.status, StageStatus::Skipped);
    }
}
