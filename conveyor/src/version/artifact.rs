//! Artifact naming.
//!
//! Names are derived values: a pure function of package name, version, and
//! commit. Determinism here is what makes re-publishing idempotent and
//! archived artifacts reproducible.

use super::Version;

/// Fixed extension for packaged artifacts.
pub const ARTIFACT_EXTENSION: &str = "tar.gz";

/// Derives the artifact name `{pkg}-{version}-{commit}`.
#[must_use]
pub fn artifact_name(pkg: &str, version: &Version, commit: &str) -> String {
    format!("{pkg}-{version}-{commit}")
}

/// Derives the artifact file name, with the fixed extension appended.
#[must_use]
pub fn artifact_file_name(pkg: &str, version: &Version, commit: &str) -> String {
    format!("{}.{ARTIFACT_EXTENSION}", artifact_name(pkg, version, commit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name_format() {
        let version = Version::new(0, 1, 0);
        assert_eq!(
            artifact_name("devops-toolchain-service", &version, "a11dfd9"),
            "devops-toolchain-service-0.1.0-a11dfd9"
        );
    }

    #[test]
    fn test_artifact_name_is_deterministic() {
        let version = Version::new(0, 1, 0);
        let first = artifact_name("devops-toolchain-service", &version, "a11dfd9");
        let second = artifact_name("devops-toolchain-service", &version, "a11dfd9");
        assert_eq!(first, second);
    }

    #[test]
    fn test_artifact_file_name_appends_extension() {
        let version = Version::new(1, 4, 2);
        assert_eq!(
            artifact_file_name("svc", &version, "deadbee"),
            "svc-1.4.2-deadbee.tar.gz"
        );
    }
}
