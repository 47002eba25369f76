use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::Version;

/// Snapshot of the environment a run executes against.
///
/// Built once before the scan and shared (`Arc`) by every test of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemUnderTest {
    pub runtime_version: Version,
    /// `None` when no SDK is installed.
    pub sdk_version: Option<Version>,
    /// Platform identifiers such as `linux`, `fedora`, `fedora39`.
    pub current_platform_ids: Vec<String>,
    /// Sanitized environment handed to every launched process.
    pub environment_variables: BTreeMap<String, String>,
    /// Free-form labels (`os=fedora`, `arch=x64`) matched by `skipWhen`.
    pub traits: BTreeSet<String>,
    /// SDK driver used by build-and-test tests.
    pub dotnet: PathBuf,
}

impl SystemUnderTest {
    #[must_use]
    pub fn new(runtime_version: Version) -> Self {
        Self {
            runtime_version,
            sdk_version: None,
            current_platform_ids: Vec::new(),
            environment_variables: BTreeMap::new(),
            traits: BTreeSet::new(),
            dotnet: PathBuf::from("dotnet"),
        }
    }

    #[must_use]
    pub fn with_sdk(mut self, sdk_version: Option<Version>) -> Self {
        self.sdk_version = sdk_version;
        self
    }

    #[must_use]
    pub fn with_platform_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current_platform_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment_variables = environment;
        self
    }

    #[must_use]
    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traits = traits.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_dotnet(mut self, dotnet: impl Into<PathBuf>) -> Self {
        self.dotnet = dotnet.into();
        self
    }

    #[must_use]
    pub fn has_sdk(&self) -> bool {
        self.sdk_version.is_some()
    }
}
