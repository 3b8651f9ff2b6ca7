//! Stage specifications.

use crate::stages::{StageAction, StageCondition};
use std::sync::Arc;
use std::time::Duration;

/// Specification for a single stage: a name bound to an action, plus its
/// gating and failure policy. Immutable once registered for a run.
#[derive(Debug, Clone)]
pub struct StageSpec {
    /// The unique name of the stage; also its ordering key.
    pub name: String,
    /// The action the stage invokes.
    pub action: Arc<dyn StageAction>,
    /// Whether a failure of this stage lets the run continue. Defaults to
    /// false: the run halts fail-fast.
    pub continue_on_failure: bool,
    /// Optional gate; absence means "always run".
    pub condition: Option<StageCondition>,
    /// Per-stage timeout overriding the runner default.
    pub timeout: Option<Duration>,
}

impl StageSpec {
    /// Creates a new stage specification.
    #[must_use]
    pub fn new(name: impl Into<String>, action: Arc<dyn StageAction>) -> Self {
        Self {
            name: name.into(),
            action,
            continue_on_failure: false,
            condition: None,
            timeout: None,
        }
    }

    /// Marks a failure of this stage as non-fatal to subsequent stages. The
    /// failure is still recorded and still fails the run overall.
    #[must_use]
    pub fn continue_on_failure(mut self) -> Self {
        self.continue_on_failure = true;
        self
    }

    /// Gates the stage on a condition.
    #[must_use]
    pub fn with_condition(mut self, condition: StageCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Sets a per-stage timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::NoOpAction;
    use crate::testing::test_context;

    #[test]
    fn test_stage_spec_defaults() {
        let spec = StageSpec::new("lint", Arc::new(NoOpAction));

        assert_eq!(spec.name, "lint");
        assert!(!spec.continue_on_failure);
        assert!(spec.condition.is_none());
        assert!(spec.timeout.is_none());
    }

    #[test]
    fn test_stage_spec_builders() {
        let spec = StageSpec::new("publish", Arc::new(NoOpAction))
            .continue_on_failure()
            .with_condition(StageCondition::branch_is("main"))
            .with_timeout(Duration::from_secs(60));

        assert!(spec.continue_on_failure);
        assert!(spec.condition.unwrap().evaluate(&test_context()));
        assert_eq!(spec.timeout, Some(Duration::from_secs(60)));
    }
}
