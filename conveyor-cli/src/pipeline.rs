//! The registered stage table, mirroring the project's delivery pipeline.
//!
//! Each stage is bound to a shell script under the scripts directory, the
//! same scripts developers run by hand. Publish is gated on the release
//! branch and marked continuable so a failed upload still lets the report
//! get archived.

use conveyor::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Pipeline name used in reports and logs.
pub const PIPELINE_NAME: &str = "devops-toolchain";

/// Builds the full stage sequence: lint, test, build, docker, publish.
pub fn build_registry(
    scripts_dir: &Path,
    release_branch: &str,
) -> Result<StageRegistry, PipelineError> {
    let mut registry = StageRegistry::new();

    registry.register(script_stage("lint", scripts_dir))?;
    registry.register(script_stage("test", scripts_dir))?;
    registry.register(script_stage("build", scripts_dir))?;
    registry.register(script_stage("docker", scripts_dir))?;
    registry.register(
        script_stage("publish", scripts_dir)
            .with_condition(StageCondition::branch_is(release_branch))
            .continue_on_failure(),
    )?;

    Ok(registry)
}

fn script_stage(name: &str, scripts_dir: &Path) -> StageSpec {
    let script = scripts_dir.join(format!("{name}.sh"));
    StageSpec::new(
        name,
        Arc::new(CommandAction::script(script.display().to_string())),
    )
}

/// Writes the finished report as JSON, whatever the run outcome. Archiving
/// failures are logged, never fatal.
pub fn archive_report(path: &Path, report: &RunReport) {
    match report.to_json() {
        Ok(json) => {
            if let Err(err) = std::fs::write(path, json) {
                warn!(path = %path.display(), error = %err, "failed to archive run report");
            }
        }
        Err(err) => warn!(error = %err, "failed to serialize run report"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_pipeline() {
        let registry = build_registry(Path::new("scripts"), "main").unwrap();
        assert_eq!(
            registry.names(),
            vec!["lint", "test", "build", "docker", "publish"]
        );
    }

    #[test]
    fn test_publish_is_gated_and_continuable() {
        let registry = build_registry(Path::new("scripts"), "main").unwrap();
        let publish = registry.get("publish").unwrap();

        assert!(publish.continue_on_failure);
        assert!(publish.condition.is_some());

        let on_main = RunContext::new(Version::new(0, 1, 0), "a11dfd9", "main");
        let on_branch = RunContext::new(Version::new(0, 1, 0), "a11dfd9", "feature/x");
        let condition = publish.condition.as_ref().unwrap();
        assert!(condition.evaluate(&on_main));
        assert!(!condition.evaluate(&on_branch));
    }

    #[test]
    fn test_other_stages_are_unconditional_and_fatal() {
        let registry = build_registry(Path::new("scripts"), "main").unwrap();
        for name in ["lint", "test", "build", "docker"] {
            let stage = registry.get(name).unwrap();
            assert!(stage.condition.is_none(), "{name} should be unconditional");
            assert!(!stage.continue_on_failure, "{name} should be fatal");
        }
    }

    #[test]
    fn test_archive_report_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let ctx = RunContext::new(Version::new(0, 1, 0), "a11dfd9", "main");
        let report = RunReport::new(PIPELINE_NAME, ctx, Vec::new(), 0.0);

        archive_report(&path, &report);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("devops-toolchain"));
    }
}
