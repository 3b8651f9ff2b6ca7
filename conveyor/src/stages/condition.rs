//! Conditional stage gating.

use crate::context::RunContext;
use std::sync::Arc;

/// A pure predicate over the run context deciding whether a stage runs.
///
/// Evaluated freshly per run, never cached, never re-evaluated mid-stage.
/// A stage without a condition always runs.
#[derive(Clone)]
pub struct StageCondition {
    description: String,
    predicate: Arc<dyn Fn(&RunContext) -> bool + Send + Sync>,
}

impl StageCondition {
    /// Creates a condition from a description and a predicate.
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&RunContext) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// A condition that always holds.
    #[must_use]
    pub fn always() -> Self {
        Self::new("always", |_| true)
    }

    /// Holds when the run executes on the named branch.
    #[must_use]
    pub fn branch_is(branch: impl Into<String>) -> Self {
        let branch = branch.into();
        Self::new(format!("branch == '{branch}'"), move |ctx| {
            ctx.is_branch(&branch)
        })
    }

    /// Holds when a captured environment value matches.
    #[must_use]
    pub fn env_is(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        Self::new(format!("env {key} == '{value}'"), move |ctx| {
            ctx.env(&key) == Some(value.as_str())
        })
    }

    /// Evaluates the predicate against a context.
    #[must_use]
    pub fn evaluate(&self, ctx: &RunContext) -> bool {
        (self.predicate)(ctx)
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Debug for StageCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageCondition")
            .field("description", &self.description)
            .finish()
    }
}
