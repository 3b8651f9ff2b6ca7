//! # Conveyor
//!
//! A sequential, fail-fast stage pipeline runner for CI/CD workflows.
//!
//! Conveyor owns an ordered list of named stages, each bound to an external
//! action (typically a process invocation), and provides:
//!
//! - **Sequential execution**: stages run one at a time, in registration order
//! - **Fail-fast semantics**: the run halts at the first failure unless the
//!   failing stage is marked continuable
//! - **Conditional gating**: per-stage predicates over the run context
//!   (e.g. publish only on the release branch)
//! - **Bounded stages**: per-stage wall-clock timeouts and cooperative
//!   cancellation between stages
//! - **Report aggregation**: per-stage results plus an overall status,
//!   renderable as a human log or as JSON
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use conveyor::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = StageRegistry::new()
//!     .with_stage(StageSpec::new("lint", Arc::new(CommandAction::script("scripts/lint.sh"))))?
//!     .with_stage(StageSpec::new("test", Arc::new(CommandAction::script("scripts/test.sh"))))?
//!     .with_stage(
//!         StageSpec::new("publish", Arc::new(CommandAction::script("scripts/publish.sh")))
//!             .with_condition(StageCondition::branch_is("main"))
//!             .continue_on_failure(),
//!     )?;
//!
//! let runner = PipelineRunner::new("devops-toolchain", registry);
//! let report = runner.run(context).await?;
//! println!("{}", report.render_text());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod stages;
pub mod testing;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::context::{probes, RunContext, RunIdentity};
    pub use crate::core::{
        FailureReason, RunReport, RunStatus, RunSummary, StageResult, StageStatus,
    };
    pub use crate::errors::{
        ContextError, DuplicateStageError, InvalidVersionError, PipelineError,
        RunInProgressError,
    };
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::pipeline::{PipelineRunner, StageRegistry, StageSpec, DEFAULT_STAGE_TIMEOUT};
    pub use crate::stages::{
        CommandAction, FnAction, NoOpAction, StageAction, StageCondition,
    };
    pub use crate::version::{
        artifact_file_name, artifact_name, BumpKind, Version, ARTIFACT_EXTENSION,
    };
}
