//! Core result and report types.
//!
//! This module provides:
//! - Stage and run status enums
//! - Per-stage result records
//! - The aggregated run report and its summary

mod report;
mod result;
mod status;

pub use report::{RunReport, RunSummary};
pub use result::StageResult;
pub use status::{FailureReason, RunStatus, StageStatus};
