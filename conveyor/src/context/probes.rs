//! External probes that supply the run context.
//!
//! Each probe is an external collaborator: a version-file reader, a VCS
//! query, a branch-detection probe, an environment capture. The runner treats
//! the values they return as opaque once collected.

use super::RunContext;
use crate::errors::ContextError;
use crate::version::Version;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Environment variables captured into the context by default.
pub const DEFAULT_ENV_KEYS: &[&str] = &["APP_NAME", "ENVIRONMENT", "LOG_LEVEL", "CI"];

/// Environment variables consulted for branch detection, in order, before
/// falling back to a VCS query. CI servers export these.
pub const BRANCH_ENV_KEYS: &[&str] = &["BRANCH_NAME", "GIT_BRANCH"];

/// Reads and parses the project version file.
///
/// The file holds a single `major.minor.patch` line; surrounding whitespace
/// is ignored.
///
/// # Errors
///
/// Returns `ContextError::VersionFileMissing` if the file does not exist,
/// `ContextError::InvalidVersion` if its contents do not parse.
pub async fn read_version_file(path: impl AsRef<Path>) -> Result<Version, ContextError> {
    let path = path.as_ref();

    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ContextError::VersionFileMissing {
                path: path.display().to_string(),
            });
        }
        Err(err) => return Err(ContextError::Io(err)),
    };

    let version = Version::parse(raw.trim())?;
    debug!(path = %path.display(), version = %version, "read version file");
    Ok(version)
}

/// Queries the short commit identifier from the repository at `repo_dir`.
///
/// # Errors
///
/// Returns `ContextError::VcsQuery` if git exits non-zero, `ContextError::Io`
/// if it cannot be spawned.
pub async fn git_short_commit(repo_dir: impl AsRef<Path>) -> Result<String, ContextError> {
    git_query(repo_dir.as_ref(), &["rev-parse", "--short", "HEAD"]).await
}

/// Detects the current branch.
///
/// CI-provided environment variables win over the local VCS query, so runs
/// on detached-HEAD build agents still see the branch they were triggered
/// for.
///
/// # Errors
///
/// Returns `ContextError::VcsQuery` or `ContextError::Io` if no environment
/// override is present and the git query fails.
pub async fn detect_branch(repo_dir: impl AsRef<Path>) -> Result<String, ContextError> {
    for key in BRANCH_ENV_KEYS {
        if let Ok(branch) = std::env::var(key) {
            if !branch.trim().is_empty() {
                debug!(source = key, branch = %branch, "branch from environment");
                return Ok(branch.trim().to_string());
            }
        }
    }

    git_query(repo_dir.as_ref(), &["rev-parse", "--abbrev-ref", "HEAD"]).await
}

/// Captures the named environment variables into a map, skipping unset ones.
#[must_use]
pub fn capture_environment(keys: &[&str]) -> BTreeMap<String, String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok().map(|value| ((*key).to_string(), value)))
        .collect()
}

/// Collects a full run context from the default probes.
///
/// # Errors
///
/// Returns the first probe failure.
pub async fn collect(
    repo_dir: impl AsRef<Path>,
    version_file: impl AsRef<Path>,
) -> Result<RunContext, ContextError> {
    let repo_dir = repo_dir.as_ref();

    let version = read_version_file(version_file).await?;
    let commit = git_short_commit(repo_dir).await?;
    let branch = detect_branch(repo_dir).await?;

    Ok(RunContext::new(version, commit, branch)
        .with_environment(capture_environment(DEFAULT_ENV_KEYS)))
}

async fn git_query(repo_dir: &Path, args: &[&str]) -> Result<String, ContextError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .await
        .map_err(ContextError::Io)?;

    if !output.status.success() {
        return Err(ContextError::vcs_query(
            format!("git {}", args.join(" ")),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_version_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VERSION");
        tokio::fs::write(&path, "1.2.3\n").await.unwrap();

        let version = read_version_file(&path).await.unwrap();
        assert_eq!(version, Version::new(1, 2, 3));
    }

    #[tokio::test]
    async fn test_read_version_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_version_file(dir.path().join("VERSION")).await;

        assert!(matches!(result, Err(ContextError::VersionFileMissing { .. })));
    }

    #[tokio::test]
    async fn test_read_version_file_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VERSION");
        tokio::fs::write(&path, "not-a-version\n").await.unwrap();

        let result = read_version_file(&path).await;
        assert!(matches!(result, Err(ContextError::InvalidVersion(_))));
    }

    #[test]
    fn test_capture_environment_skips_unset() {
        let captured = capture_environment(&["CONVEYOR_TEST_UNSET_VARIABLE"]);
        assert!(captured.is_empty());
    }

    #[test]
    fn test_capture_environment_picks_up_set_vars() {
        std::env::set_var("CONVEYOR_TEST_PROBE_VAR", "on");
        let captured = capture_environment(&["CONVEYOR_TEST_PROBE_VAR"]);
        std::env::remove_var("CONVEYOR_TEST_PROBE_VAR");

        assert_eq!(captured.get("CONVEYOR_TEST_PROBE_VAR").map(String::as_str), Some("on"));
    }
}
