use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a test directory is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionKind {
    /// Run the directory's `test.sh` entry point.
    #[serde(rename = "shell", alias = "bash")]
    Shell,
    /// `dotnet build` followed by `dotnet test`.
    #[serde(rename = "build-and-test", alias = "xunit", alias = "build_and_test")]
    BuildAndTest,
}

impl ExecutionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::BuildAndTest => "build-and-test",
        }
    }
}

impl std::fmt::Display for ExecutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The contents of a `test.json` manifest.
///
/// Missing booleans are `false`, a missing `timeoutMultiplier` is `1.0` and
/// missing lists are empty; every default is spelled out below rather than
/// left to field initialisers.
///
/// ```json
/// {
///   "name": "hello-world",
///   "enabled": true,
///   "requiresSdk": true,
///   "version": "2.1",
///   "versionSpecific": false,
///   "type": "shell",
///   "cleanup": true,
///   "timeoutMultiplier": 2.0,
///   "ignoredRIDs": ["alpine"],
///   "skipWhen": ["os=fedora,arch=arm64"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDescriptor {
    pub name: String,

    #[serde(default = "default_false")]
    pub enabled: bool,

    #[serde(default = "default_false")]
    pub requires_sdk: bool,

    /// Minimum runtime version, or for version-specific tests the exact
    /// `Major.Minor` / `Major.x` pattern.
    pub version: String,

    #[serde(default = "default_false")]
    pub version_specific: bool,

    #[serde(rename = "type")]
    pub kind: ExecutionKind,

    #[serde(default = "default_false")]
    pub cleanup: bool,

    #[serde(default = "default_timeout_multiplier")]
    pub timeout_multiplier: f64,

    #[serde(
        rename = "ignoredRIDs",
        alias = "platformBlacklist",
        default = "Vec::new"
    )]
    pub ignored_rids: Vec<String>,

    #[serde(default = "Vec::new")]
    pub skip_when: Vec<String>,
}

fn default_false() -> bool {
    false
}

fn default_timeout_multiplier() -> f64 {
    1.0
}

impl TestDescriptor {
    /// Minimal enabled descriptor; mostly useful for building fixtures.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>, kind: ExecutionKind) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            requires_sdk: false,
            version: version.into(),
            version_specific: false,
            kind,
            cleanup: false,
            timeout_multiplier: default_timeout_multiplier(),
            ignored_rids: Vec::new(),
            skip_when: Vec::new(),
        }
    }

    /// Per-test timeout: `timeout_multiplier × default_timeout`.
    ///
    /// `None` means "no timeout" and is returned when either factor is zero,
    /// or when the product does not fit in a `Duration`.
    #[must_use]
    pub fn timeout(&self, default_timeout: Duration) -> Option<Duration> {
        if default_timeout.is_zero() || self.timeout_multiplier <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(default_timeout.as_secs_f64() * self.timeout_multiplier).ok()
    }
}
