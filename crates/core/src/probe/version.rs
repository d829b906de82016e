use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^\d.])(\d+)\.(\d+)\.(\d+)").expect("valid regex")
    })
}

/// Extract `major.minor.patch` from `sam --version` output.
///
/// Accepts `SAM CLI, version 1.2.3` as well as a bare `1.2.3`.
pub fn parse_version(output: &str) -> Option<Version> {
    let caps = version_regex().captures(output.trim())?;
    let major = caps[1].parse().ok()?;
    let minor = caps[2].parse().ok()?;
    let patch = caps[3].parse().ok()?;
    Some(Version::new(major, minor, patch))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    TooOld,
    TooNew,
    VersionNotParseable,
    NotFound,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationOutcome::Valid => "valid",
            ValidationOutcome::TooOld => "too old",
            ValidationOutcome::TooNew => "too new",
            ValidationOutcome::VersionNotParseable => "version not parseable",
            ValidationOutcome::NotFound => "not found",
        };
        f.write_str(s)
    }
}

/// Half-open range `[min, max)` of supported tool versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedRange {
    pub min: Version,
    pub max: Version,
}

impl Default for SupportedRange {
    fn default() -> Self {
        Self {
            min: Version::new(0, 7, 0),
            max: Version::new(2, 0, 0),
        }
    }
}

impl SupportedRange {
    pub fn new(min: Version, max: Version) -> Self {
        Self { min, max }
    }

    pub fn classify(&self, version: &Version) -> ValidationOutcome {
        if *version < self.min {
            ValidationOutcome::TooOld
        } else if *version >= self.max {
            ValidationOutcome::TooNew
        } else {
            ValidationOutcome::Valid
        }
    }
}

impl fmt::Display for SupportedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">={}, <{}", self.min, self.max)
    }
}
