//! Error types for the conveyor runner.
//!
//! Stage failures are not errors: they are recorded in the run report and the
//! loop decides whether to halt. The types here cover the cases where an
//! operation cannot produce a report at all.

use thiserror::Error;

/// The main error type for conveyor operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage name was registered twice.
    #[error("{0}")]
    DuplicateStage(#[from] DuplicateStageError),

    /// A version string could not be parsed.
    #[error("{0}")]
    InvalidVersion(#[from] InvalidVersionError),

    /// A run was attempted while another run was in progress.
    #[error("{0}")]
    RunInProgress(#[from] RunInProgressError),

    /// Building the run context failed.
    #[error("{0}")]
    Context(#[from] ContextError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when registering a stage under a name that is already taken.
///
/// Registration-time programmer error: the pipeline definition is wrong, so
/// this is fatal at startup rather than something a run can recover from.
#[derive(Debug, Clone, Error)]
#[error("duplicate stage '{name}': already registered at position {first_index}")]
pub struct DuplicateStageError {
    /// The conflicting stage name.
    pub name: String,
    /// Position of the earlier registration in execution order.
    pub first_index: usize,
}

impl DuplicateStageError {
    /// Creates a new duplicate stage error.
    #[must_use]
    pub fn new(name: impl Into<String>, first_index: usize) -> Self {
        Self {
            name: name.into(),
            first_index,
        }
    }
}

/// Error raised when a version string cannot be parsed.
#[derive(Debug, Clone, Error)]
#[error("invalid version '{input}': {reason}")]
pub struct InvalidVersionError {
    /// The rejected input string.
    pub input: String,
    /// Why the input was rejected.
    pub reason: String,
}

impl InvalidVersionError {
    /// Creates a new invalid version error.
    #[must_use]
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised when `run()` is called while a run is already in progress.
///
/// The rejected call has no side effects; the in-progress run is untouched.
#[derive(Debug, Clone, Error)]
#[error("pipeline '{pipeline}' already has a run in progress")]
pub struct RunInProgressError {
    /// The pipeline that rejected the run.
    pub pipeline: String,
}

impl RunInProgressError {
    /// Creates a new run-in-progress error.
    #[must_use]
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
        }
    }
}

/// Errors raised while collecting the run context from external probes.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The version file does not exist.
    #[error("version file not found: {path}")]
    VersionFileMissing {
        /// The path that was probed.
        path: String,
    },

    /// A VCS query returned a failure status.
    #[error("VCS query '{command}' failed: {message}")]
    VcsQuery {
        /// The command that was run.
        command: String,
        /// Captured stderr or a description of the failure.
        message: String,
    },

    /// The version file held a malformed version string.
    #[error("{0}")]
    InvalidVersion(#[from] InvalidVersionError),

    /// IO error while probing.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContextError {
    /// Creates a VCS query error.
    #[must_use]
    pub fn vcs_query(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VcsQuery {
            command: command.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_stage_error_display() {
        let err = DuplicateStageError::new("lint", 0);
        assert!(err.to_string().contains("duplicate stage 'lint'"));
        assert!(err.to_string().contains("position 0"));
    }

    #[test]
    fn test_invalid_version_error_display() {
        let err = InvalidVersionError::new("1.x.3", "component 'x' is not numeric");
        assert!(err.to_string().contains("1.x.3"));
        assert!(err.to_string().contains("not numeric"));
    }

    #[test]
    fn test_run_in_progress_error_display() {
        let err = RunInProgressError::new("devops-toolchain");
        assert!(err.to_string().contains("devops-toolchain"));
    }

    #[test]
    fn test_pipeline_error_from_duplicate() {
        let err: PipelineError = DuplicateStageError::new("test", 1).into();
        assert!(matches!(err, PipelineError::DuplicateStage(_)));
    }

    #[test]
    fn test_context_error_vcs_query() {
        let err = ContextError::vcs_query("git rev-parse --short HEAD", "not a git repository");
        assert!(err.to_string().contains("git rev-parse"));
        assert!(err.to_string().contains("not a git repository"));
    }
}
