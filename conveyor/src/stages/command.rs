//! Process-invoking stage action.

use super::StageAction;
use crate::context::RunContext;
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// An action that spawns an external program and reports its exit code.
///
/// The child inherits stdio so tool output lands in the pipeline log. The
/// run context is exported to the child as `VERSION`, `COMMIT`, and `BRANCH`,
/// plus the context's captured environment, so stage scripts see the same
/// values the runner recorded instead of re-probing them mid-run.
#[derive(Debug, Clone)]
pub struct CommandAction {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CommandAction {
    /// Creates an action invoking the given program.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
        }
    }

    /// Creates an action running a shell script, the `bash <script>` idiom
    /// stage scripts are invoked with.
    #[must_use]
    pub fn script(path: impl Into<String>) -> Self {
        Self::new("bash").with_arg(path)
    }

    /// Appends one argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory for the child.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Adds an extra environment variable for the child.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl StageAction for CommandAction {
    async fn invoke(&self, ctx: &RunContext) -> Result<i32> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env("VERSION", ctx.version.to_string())
            .env("COMMIT", &ctx.commit)
            .env("BRANCH", &ctx.branch)
            .envs(ctx.environment.iter())
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        debug!(program = %self.program, args = ?self.args, "spawning stage command");

        let status = command
            .status()
            .await
            .with_context(|| format!("failed to spawn '{}'", self.program))?;

        // A signal-terminated child has no exit code on Unix; report the
        // conventional -1 so the non-zero rule applies uniformly.
        Ok(status.code().unwrap_or(-1))
    }
}
