//! Stage actions.
//!
//! Actions are the external collaborators a stage is bound to: typically an
//! invocation of a named script or tool. The runner only consumes the exit
//! code and the wall-clock duration; everything else the action does happens
//! through side effects the runner does not model.

mod command;
mod condition;

pub use command::CommandAction;
pub use condition::StageCondition;

use crate::context::RunContext;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for stage actions.
///
/// An action produces a process-style exit code: 0 passes, anything else
/// fails. An `Err` return means the action could not produce an exit code at
/// all (spawn failure, IO error) and is treated as a failure by the runner.
/// Retries, if desired, are the action's own responsibility - re-invoke
/// internally and report a single final exit code.
#[async_trait]
pub trait StageAction: Send + Sync + Debug {
    /// Invokes the action against the run context.
    async fn invoke(&self, ctx: &RunContext) -> Result<i32>;
}

/// A closure-based action, for tests and embedded pipelines.
pub struct FnAction<F>
where
    F: Fn(&RunContext) -> Result<i32> + Send + Sync,
{
    func: F,
}

impl<F> FnAction<F>
where
    F: Fn(&RunContext) -> Result<i32> + Send + Sync,
{
    /// Creates a new closure-based action.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Debug for FnAction<F>
where
    F: Fn(&RunContext) -> Result<i32> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAction").finish()
    }
}

#[async_trait]
impl<F> StageAction for FnAction<F>
where
    F: Fn(&RunContext) -> Result<i32> + Send + Sync,
{
    async fn invoke(&self, ctx: &RunContext) -> Result<i32> {
        (self.func)(ctx)
    }
}

/// An action that always exits 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAction;

#[async_trait]
impl StageAction for NoOpAction {
    async fn invoke(&self, _ctx: &RunContext) -> Result<i32> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_context;

    #[tokio::test]
    async fn test_fn_action_sees_context() {
        let action = FnAction::new(|ctx| Ok(i32::from(!ctx.is_branch("main"))));

        let exit = action.invoke(&test_context()).await.unwrap();
        assert_eq!(exit, 0);
    }

    #[tokio::test]
    async fn test_fn_action_propagates_error() {
        let action = FnAction::new(|_ctx| anyhow::bail!("tool not installed"));

        let err = action.invoke(&test_context()).await.unwrap_err();
        assert!(err.to_string().contains("tool not installed"));
    }

    #[tokio::test]
    async fn test_noop_action() {
        let exit = NoOpAction.invoke(&test_context()).await.unwrap();
        assert_eq!(exit, 0);
    }
}
