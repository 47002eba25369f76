//! Configuration management for rtcheck
//!
//! Hierarchical configuration with discovery and precedence
//! CLI > file > defaults. The file is TOML with optional `[defaults]`,
//! `[feeds]`, `[environment]` and `[runner]` sections:
//!
//! ```toml
//! [defaults]
//! timeout_secs = 600
//! compatible = true
//! log_directory = "logs"
//!
//! [feeds]
//! additional = ["https://pkgs.example.org/feed/index.json"]
//! resolve_prodcon = false
//!
//! [environment]
//! filtered_variables = ["DOTNET_ROOT"]
//! extra_traits = ["runtime=mono"]
//!
//! [runner]
//! kill_grace_ms = 2000
//! dotnet = "/usr/lib64/dotnet/dotnet"
//! ```

mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use cli_args::CliArgs;
pub use model::*;
pub use rtcheck_utils::types::ConfigSource;

use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Per-test default timeout; `Duration::ZERO` means none.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    #[must_use]
    pub fn compatible(&self) -> bool {
        self.defaults.compatible.unwrap_or(false)
    }

    /// Directory for per-test logs and `results.xml`, relative paths resolved
    /// against `cwd`. Defaults to `cwd` itself.
    #[must_use]
    pub fn log_directory(&self, cwd: &Path) -> PathBuf {
        match &self.defaults.log_directory {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        }
    }

    #[must_use]
    pub fn resolve_prodcon(&self) -> bool {
        self.feeds.resolve_prodcon.unwrap_or(true)
    }

    #[must_use]
    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.runner.kill_grace_ms.unwrap_or(0))
    }

    /// Defaults only, no discovery. Useful for embedding and tests.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            defaults: Defaults::default(),
            feeds: FeedsConfig::default(),
            environment: EnvironmentConfig::default(),
            runner: RunnerConfig::default(),
            config_path: None,
            source_attribution: std::collections::HashMap::new(),
        }
    }
}
