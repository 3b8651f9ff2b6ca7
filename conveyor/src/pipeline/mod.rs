//! Pipeline definition and execution.
//!
//! This module provides:
//! - Stage specifications
//! - The insertion-ordered stage registry
//! - The sequential fail-fast runner

mod registry;
mod runner;
mod spec;


pub use registry::StageRegistry;
pub use runner::{PipelineRunner, DEFAULT_STAGE_TIMEOUT};
pub use spec::StageSpec;
