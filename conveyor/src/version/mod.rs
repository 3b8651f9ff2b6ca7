//! Versioning: parse, bump, display.
//!
//! Versions are three numeric components. Parsing is deliberately lenient
//! about missing trailing components (they default to 0) and strict about
//! non-numeric ones. Components beyond the third are ignored.

mod artifact;

pub use artifact::{artifact_file_name, artifact_name, ARTIFACT_EXTENSION};

use crate::errors::InvalidVersionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` version.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(into = "String", try_from = "String")]
pub struct Version {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
}

impl Version {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses a version string.
    ///
    /// Splits on `.`; missing trailing components default to 0, components
    /// beyond the third are ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersionError` for an empty input or a non-numeric
    /// component.
    pub fn parse(input: &str) -> Result<Self, InvalidVersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(InvalidVersionError::new(input, "empty version string"));
        }

        let mut components = [0_u64; 3];
        for (slot, part) in components.iter_mut().zip(trimmed.split('.')) {
            *slot = part.parse().map_err(|_| {
                InvalidVersionError::new(input, format!("component '{part}' is not numeric"))
            })?;
        }

        Ok(Self::new(components[0], components[1], components[2]))
    }

    /// Returns the version produced by a bump of the given kind.
    ///
    /// Major resets minor and patch to 0; minor resets patch to 0; patch
    /// increments only itself.
    #[must_use]
    pub const fn bump(self, kind: BumpKind) -> Self {
        match kind {
            BumpKind::Major => Self::new(self.major + 1, 0, 0),
            BumpKind::Minor => Self::new(self.major, self.minor + 1, 0),
            BumpKind::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = InvalidVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for Version {
    type Error = InvalidVersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Which component a bump increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BumpKind {
    /// Increment major, reset minor and patch.
    Major,
    /// Increment minor, reset patch.
    Minor,
    /// Increment patch only. The default, and the fallback for
    /// unrecognized kind strings.
    #[default]
    Patch,
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

impl FromStr for BumpKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "major" => Self::Major,
            "minor" => Self::Minor,
            _ => Self::Patch,
        })
    }
}
