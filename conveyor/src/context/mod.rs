//! Run context: immutable per-run metadata.
//!
//! The context is collected once at run start from external probes (version
//! file, VCS query, branch detection, environment capture) and threaded
//! read-only through every stage. Stages never re-read these sources
//! mid-run.

pub mod probes;

use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identifies a pipeline run for log and report correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this run.
    pub run_id: Uuid,
    /// Who or what triggered the run, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,
}

impl RunIdentity {
    /// Creates a new identity with a generated run ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            triggered_by: None,
        }
    }

    /// Sets the trigger description.
    #[must_use]
    pub fn with_triggered_by(mut self, triggered_by: impl Into<String>) -> Self {
        self.triggered_by = Some(triggered_by.into());
        self
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable per-run metadata: version, commit, branch, environment.
///
/// Built once per run; read-only to stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    /// The version being built.
    pub version: Version,
    /// Short VCS commit identifier.
    pub commit: String,
    /// The branch the run executes on.
    pub branch: String,
    /// Captured environment values.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Correlation identity for this run.
    #[serde(default)]
    pub identity: RunIdentity,
}

impl RunContext {
    /// Creates a context with an empty environment and a fresh identity.
    #[must_use]
    pub fn new(version: Version, commit: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            version,
            commit: commit.into(),
            branch: branch.into(),
            environment: BTreeMap::new(),
            identity: RunIdentity::new(),
        }
    }

    /// Adds a single environment entry.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Replaces the captured environment.
    #[must_use]
    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the run identity.
    #[must_use]
    pub fn with_identity(mut self, identity: RunIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Looks up a captured environment value.
    #[must_use]
    pub fn env(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str)
    }

    /// Returns true if the run executes on the named branch.
    #[must_use]
    pub fn is_branch(&self, name: &str) -> bool {
        self.branch == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RunContext {
        RunContext::new(Version::new(0, 1, 0), "a11dfd9", "main")
    }

    #[test]
    fn test_context_creation() {
        let ctx = context();

        assert_eq!(ctx.commit, "a11dfd9");
        assert_eq!(ctx.branch, "main");
        assert!(ctx.environment.is_empty());
    }

    #[test]
    fn test_context_env_lookup() {
        let ctx = context().with_env("ENVIRONMENT", "staging");

        assert_eq!(ctx.env("ENVIRONMENT"), Some("staging"));
        assert_eq!(ctx.env("MISSING"), None);
    }

    #[test]
    fn test_context_is_branch() {
        let ctx = context();

        assert!(ctx.is_branch("main"));
        assert!(!ctx.is_branch("develop"));
    }

    #[test]
    fn test_identity_is_unique_per_context() {
        let a = context();
        let b = context();

        assert_ne!(a.identity.run_id, b.identity.run_id);
    }

    #[test]
    fn test_context_serialization_round_trip() {
        let ctx = context()
            .with_env("CI", "true")
            .with_identity(RunIdentity::new().with_triggered_by("devopsctl"));

        let json = serde_json::to_string(&ctx).unwrap();
        let deserialized: RunContext = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.version, ctx.version);
        assert_eq!(deserialized.env("CI"), Some("true"));
        assert_eq!(deserialized.identity.triggered_by.as_deref(), Some("devopsctl"));
    }
}
