use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use rtcheck_utils::types::ConfigSource;

/// Per-test timeout used when neither the CLI nor the config file sets one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for an rtcheck run.
///
/// Built by [`Config::discover_from`] with precedence
/// CLI arguments > `.rtcheck/config.toml` > built-in defaults. Which layer
/// supplied each value is recorded in `source_attribution`.
#[derive(Debug, Clone)]
pub struct Config {
    pub defaults: Defaults,
    pub feeds: FeedsConfig,
    pub environment: EnvironmentConfig,
    pub runner: RunnerConfig,
    /// The file that was loaded, if any.
    pub config_path: Option<PathBuf>,
    pub source_attribution: HashMap<String, ConfigSource>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Per-test timeout in seconds; 0 disables timeouts.
    pub timeout_secs: Option<u64>,
    pub verbose: Option<bool>,
    /// dotnet-bunny compatible console output.
    pub compatible: Option<bool>,
    pub log_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedsConfig {
    /// Extra NuGet package sources written into each test's `nuget.config`.
    #[serde(default)]
    pub additional: Vec<String>,
    /// Look up the source-build ProdCon feed when runtime packages are not live.
    pub resolve_prodcon: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Variables removed from the environment handed to tests, on top of the
    /// built-in list.
    #[serde(default)]
    pub filtered_variables: Vec<String>,
    /// Traits added to the detected ones.
    #[serde(default)]
    pub extra_traits: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Milliseconds between SIGTERM and SIGKILL when a test times out.
    pub kill_grace_ms: Option<u64>,
    /// Path to the `dotnet` driver; looked up on `PATH` when unset.
    pub dotnet: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            verbose: Some(false),
            compatible: Some(false),
            log_directory: None,
        }
    }
}

/// On-disk layout of `.rtcheck/config.toml`.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub defaults: Option<Defaults>,
    pub feeds: Option<FeedsConfig>,
    pub environment: Option<EnvironmentConfig>,
    pub runner: Option<RunnerConfig>,
}
